//! User account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, PenaltyResponse, UpdateUser, User},
};

use super::AuthenticatedUser;

/// Register a new account (open endpoint)
#[utoipa::path(
    post,
    path = "/register/",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid input or username taken")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get account details; own account, or any account for staff
#[utoipa::path(
    get,
    path = "/user/{id}/",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account details", body = User),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_self_or_staff(id)?;

    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Update an account; own account, or any account for staff
#[utoipa::path(
    put,
    path = "/user/{id}/",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Account updated", body = User),
        (status = 400, description = "Invalid input or username taken"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    claims.require_self_or_staff(id)?;

    let user = state.services.users.update_user(id, request).await?;
    Ok(Json(user))
}

/// Penalty total; own account, or any account for staff
#[utoipa::path(
    get,
    path = "/user/{id}/penalty/",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Penalty total", body = PenaltyResponse),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_penalty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<PenaltyResponse>> {
    claims.require_self_or_staff(id)?;

    let penalty = state.services.users.get_penalty(id).await?;
    Ok(Json(penalty))
}
