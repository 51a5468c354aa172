//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub author_id: i32,
    pub category_id: i32,
    /// Copies the library owns. Invariant: 0 <= available_copies <= total_copies.
    pub total_copies: i32,
    /// Copies not currently checked out
    pub available_copies: i32,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Create book request; `available_copies` starts at `total_copies`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    pub description: String,
    pub author_id: i32,
    pub category_id: i32,
    #[validate(range(min = 1, message = "A book needs at least one copy"))]
    pub total_copies: i32,
}

/// Update book request; `available_copies` is read-only and tracks
/// `total_copies` changes by the same delta
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    #[validate(range(min = 1, message = "A book needs at least one copy"))]
    pub total_copies: Option<i32>,
}
