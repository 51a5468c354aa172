//! Borrows repository: the transactional borrow/return workflow
//!
//! Both workflows run inside a single transaction holding an exclusive
//! row lock on the book (and, for returns, the borrow row), so concurrent
//! attempts against the same book serialize and `available_copies` can
//! never go negative or exceed `total_copies`.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{Borrow, BorrowDetails},
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book. Inside one transaction: lock the book row, check
    /// availability, check the caller's open-borrow ceiling, insert the
    /// borrow, decrement the available count. Any early return rolls the
    /// whole thing back.
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        loan_period_days: i64,
        max_open_borrows: i64,
    ) -> AppResult<Borrow> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if !book.is_available() {
            return Err(AppError::BookNotAvailable);
        }

        let open_borrows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE user_id = $1 AND return_date IS NULL",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if open_borrows >= max_open_borrows {
            return Err(AppError::MaxBorrowsReached {
                current: open_borrows,
                max: max_open_borrows,
            });
        }

        let due_date = today + Duration::days(loan_period_days);
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, user_id, book_id, borrow_date, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(book_id)
        .bind(today)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            book_id,
            borrow_id = %borrow.id,
            due_date = %borrow.due_date,
            "book borrowed"
        );
        Ok(borrow)
    }

    /// Return a borrowed book. The open borrow and its book are locked
    /// together; the penalty update is the last write before commit.
    /// Returns the closed borrow and the penalty points applied.
    pub async fn return_borrow(&self, user_id: i32, borrow_id: Uuid) -> AppResult<(Borrow, i64)> {
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE on the join locks both the borrow and the book row
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            SELECT bo.id, bo.user_id, bo.book_id, bo.borrow_date, bo.due_date, bo.return_date
            FROM borrows bo
            JOIN books b ON b.id = bo.book_id
            WHERE bo.id = $1 AND bo.user_id = $2 AND bo.return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(borrow_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::InvalidBorrow)?;

        sqlx::query("UPDATE borrows SET return_date = $1 WHERE id = $2")
            .bind(today)
            .bind(borrow_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(borrow.book_id)
            .execute(&mut *tx)
            .await?;

        let days_late = borrow.days_late(today);
        if days_late > 0 {
            sqlx::query("UPDATE users SET penalty_points = penalty_points + $1 WHERE id = $2")
                .bind(days_late as i32)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(user_id, borrow_id = %borrow_id, days_late, "book returned");

        let closed = Borrow {
            return_date: Some(today),
            ..borrow
        };
        Ok((closed, days_late))
    }

    /// Open borrows for a user, oldest first
    pub async fn get_open_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT bo.id, bo.book_id, b.title AS book_title, bo.borrow_date, bo.due_date
            FROM borrows bo
            JOIN books b ON b.id = bo.book_id
            WHERE bo.user_id = $1 AND bo.return_date IS NULL
            ORDER BY bo.borrow_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let today = Utc::now().date_naive();

        let mut result = Vec::new();
        for row in rows {
            let due_date: NaiveDate = row.get("due_date");
            result.push(BorrowDetails {
                id: row.get("id"),
                book_id: row.get("book_id"),
                book_title: row.get("book_title"),
                borrow_date: row.get("borrow_date"),
                due_date,
                is_overdue: today > due_date,
            });
        }

        Ok(result)
    }
}
