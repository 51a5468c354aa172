//! Account management service: registration, authentication, penalty inquiry

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, PenaltyResponse, Role, UpdateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new member account
    pub async fn register(&self, request: CreateUser) -> AppResult<User> {
        request.validate()?;

        if self
            .repository
            .users
            .username_exists(&request.username, None)
            .await?
        {
            return Err(AppError::Duplicate(format!(
                "Username '{}' is already taken",
                request.username
            )));
        }

        let hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.username, &hash, Role::Member)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate by username and password, returning a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update username and/or password
    pub async fn update_user(&self, id: i32, request: UpdateUser) -> AppResult<User> {
        request.validate()?;

        if let Some(ref username) = request.username {
            if self
                .repository
                .users
                .username_exists(username, Some(id))
                .await?
            {
                return Err(AppError::Duplicate(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
        }

        let hash = match request.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(id, request.username.as_deref(), hash.as_deref())
            .await
    }

    /// Penalty total for a user; authorization happens at the endpoint
    pub async fn get_penalty(&self, user_id: i32) -> AppResult<PenaltyResponse> {
        let user = self.repository.users.get_by_id(user_id).await?;
        Ok(PenaltyResponse {
            user_id: user.id,
            username: user.username,
            penalty_points: user.penalty_points,
        })
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
