//! Borrow model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Borrow record from database. Lifecycle: open (no return date) → closed,
/// one-way; rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: Uuid,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Borrow {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Overdue means strictly past the due date
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        as_of > self.due_date
    }

    /// Whole days past the due date; zero when on time
    pub fn days_late(&self, as_of: NaiveDate) -> i64 {
        if self.is_overdue(as_of) {
            (as_of - self.due_date).num_days()
        } else {
            0
        }
    }
}

/// Open borrow joined with book data for listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub is_overdue: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borrow(due: NaiveDate) -> Borrow {
        Borrow {
            id: Uuid::nil(),
            user_id: 1,
            book_id: 1,
            borrow_date: due - chrono::Duration::days(14),
            due_date: due,
            return_date: None,
        }
    }

    #[test]
    fn due_day_itself_is_not_overdue() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let b = borrow(due);
        assert!(!b.is_overdue(due));
        assert_eq!(b.days_late(due), 0);
    }

    #[test]
    fn five_days_past_due_is_five_penalty_points() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let b = borrow(due);
        let returned = due + chrono::Duration::days(5);
        assert!(b.is_overdue(returned));
        assert_eq!(b.days_late(returned), 5);
    }

    #[test]
    fn early_return_accrues_nothing() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let b = borrow(due);
        let returned = due - chrono::Duration::days(3);
        assert_eq!(b.days_late(returned), 0);
    }

    #[test]
    fn open_until_returned() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let mut b = borrow(due);
        assert!(b.is_open());
        b.return_date = Some(due);
        assert!(!b.is_open());
    }
}
