//! Author catalog endpoints (staff only, as in the original)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        user::Capability,
    },
};

use super::AuthenticatedUser;

/// List all authors
#[utoipa::path(
    get,
    path = "/authors/",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of authors", body = Vec<Author>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Author>>> {
    claims.require(Capability::ManageAuthors)?;

    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    claims.require(Capability::ManageAuthors)?;

    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors/",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input or name taken"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require(Capability::ManageAuthors)?;

    let created = state.services.catalog.create_author(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input or name taken"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    claims.require(Capability::ManageAuthors)?;

    let updated = state.services.catalog.update_author(id, request).await?;
    Ok(Json(updated))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Capability::ManageAuthors)?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
