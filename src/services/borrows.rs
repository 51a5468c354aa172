//! Borrowing workflow service

use uuid::Uuid;

use crate::{
    config::BorrowingConfig,
    error::{AppError, AppResult},
    models::borrow::{Borrow, BorrowDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    config: BorrowingConfig,
}

impl BorrowsService {
    pub fn new(repository: Repository, config: BorrowingConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a book for the given user
    pub async fn borrow_book(&self, user_id: i32, book_id: i32) -> AppResult<Borrow> {
        self.repository
            .borrows
            .create(
                user_id,
                book_id,
                self.config.loan_period_days,
                self.config.max_open_borrows,
            )
            .await
    }

    /// Return a borrowed book. The borrow id arrives as a string and must
    /// be a structurally valid UUID before any database work happens.
    pub async fn return_book(&self, user_id: i32, borrow_id: &str) -> AppResult<(Borrow, i64)> {
        let borrow_id = Uuid::parse_str(borrow_id)
            .map_err(|_| AppError::Validation("Invalid borrow id".to_string()))?;
        self.repository.borrows.return_borrow(user_id, borrow_id).await
    }

    /// List the caller's open borrows
    pub async fn list_open_borrows(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.get_open_for_user(user_id).await
    }
}
