//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook, UpdateBook},
        user::Capability,
    },
};

use super::AuthenticatedUser;

/// List all books
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    claims.require(Capability::BrowseBooks)?;

    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require(Capability::BrowseBooks)?;

    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book (staff only); all copies start available
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require(Capability::ManageBooks)?;

    let created = state.services.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book (staff only)
#[utoipa::path(
    put,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or copy-count conflict"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require(Capability::ManageBooks)?;

    let updated = state.services.catalog.update_book(id, request).await?;
    Ok(Json(updated))
}

/// Delete a book (staff only)
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Capability::ManageBooks)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
