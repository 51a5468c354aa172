//! Borrowing workflow endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::borrow::BorrowDetails};

use super::AuthenticatedUser;

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// The book to borrow
    pub book_id: i32,
}

/// Borrow response with the due date
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Borrow ID (UUID)
    pub borrow_id: Uuid,
    /// Date the book is due back
    pub due_date: NaiveDate,
    /// Status message
    pub message: String,
}

/// Return request; the id is validated as a UUID before any lookup
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// The borrow record to close
    pub borrow_id: String,
}

/// Return response with the penalty applied
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Borrow ID (UUID)
    pub borrow_id: Uuid,
    /// Date the book came back
    pub return_date: NaiveDate,
    /// Late days added to the caller's penalty total (0 when on time)
    pub penalty_points_added: i64,
    /// Status message
    pub message: String,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "Book not available or borrow limit reached"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let borrow = state
        .services
        .borrows
        .borrow_book(claims.user_id, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            borrow_id: borrow.id,
            due_date: borrow.due_date,
            message: "Borrowing book is successful".to_string(),
        }),
    ))
}

/// List the caller's open borrows
#[utoipa::path(
    get,
    path = "/borrow/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open borrows", body = Vec<BorrowDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state
        .services
        .borrows
        .list_open_borrows(claims.user_id)
        .await?;
    Ok(Json(borrows))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrow/return/",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Invalid borrow record or book already returned")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let (borrow, penalty_points_added) = state
        .services
        .borrows
        .return_book(claims.user_id, &request.borrow_id)
        .await?;

    Ok(Json(ReturnResponse {
        borrow_id: borrow.id,
        return_date: borrow.return_date.unwrap_or(borrow.due_date),
        penalty_points_added,
        message: "Book returned successfully".to_string(),
    }))
}
