//! Category catalog endpoints (staff only, as in the original)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        category::{Category, CreateCategory, UpdateCategory},
        user::Capability,
    },
};

use super::AuthenticatedUser;

/// List all categories
#[utoipa::path(
    get,
    path = "/categories/",
    tag = "categories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Category>>> {
    claims.require(Capability::ManageCategories)?;

    let categories = state.services.catalog.list_categories().await?;
    Ok(Json(categories))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}/",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category details", body = Category),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Category>> {
    claims.require(Capability::ManageCategories)?;

    let category = state.services.catalog.get_category(id).await?;
    Ok(Json(category))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/categories/",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid or duplicate name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    claims.require(Capability::ManageCategories)?;

    let created = state.services.catalog.create_category(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categories/{id}/",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid or duplicate name"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    claims.require(Capability::ManageCategories)?;

    let updated = state.services.catalog.update_category(id, request).await?;
    Ok(Json(updated))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}/",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Capability::ManageCategories)?;

    state.services.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
