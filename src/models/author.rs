//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub bio: String,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    pub bio: String,
}

/// Update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
    pub bio: Option<String>,
}
