//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::user::User};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// The authenticated account
    pub user: User,
}

/// Authenticate and obtain a JWT token
#[utoipa::path(
    post,
    path = "/login/",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Get the current account from the token
#[utoipa::path(
    get,
    path = "/me/",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}
