//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Account roles. `Librarian` and `Admin` are staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }

    /// The action → required role table. Every endpoint funnels its
    /// permission decision through here.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::BrowseBooks | Capability::Borrow => true,
            Capability::ManageBooks
            | Capability::ManageAuthors
            | Capability::ManageCategories
            | Capability::ViewAnyUser => self.is_staff(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as TEXT)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Actions an endpoint may require before invoking a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    BrowseBooks,
    Borrow,
    ManageBooks,
    ManageAuthors,
    ManageCategories,
    ViewAnyUser,
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    /// Cumulative late-return days
    pub penalty_points: i32,
    pub created_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Update user request; `penalty_points` is read-only through the API
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
}

/// Penalty inquiry response
#[derive(Debug, Serialize, ToSchema)]
pub struct PenaltyResponse {
    pub user_id: i32,
    pub username: String,
    pub penalty_points: i32,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Authorization check used at the top of every handler
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Insufficient rights for {:?}",
                capability
            )))
        }
    }

    /// Self-or-staff rule for per-user resources (profile, penalty)
    pub fn require_self_or_staff(&self, user_id: i32) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You may only access your own account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_capability_table() {
        assert!(Role::Member.allows(Capability::BrowseBooks));
        assert!(Role::Member.allows(Capability::Borrow));
        assert!(!Role::Member.allows(Capability::ManageBooks));
        assert!(!Role::Member.allows(Capability::ViewAnyUser));

        for staff in [Role::Librarian, Role::Admin] {
            assert!(staff.allows(Capability::ManageBooks));
            assert!(staff.allows(Capability::ManageAuthors));
            assert!(staff.allows(Capability::ManageCategories));
            assert!(staff.allows(Capability::ViewAnyUser));
        }
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::Member, Role::Librarian, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn claims_token_round_trip() {
        let iat = 1_700_000_000;
        let claims = UserClaims {
            sub: "reader".to_string(),
            user_id: 7,
            role: Role::Member,
            // far enough ahead that the default exp validation passes
            exp: 4_102_444_800,
            iat,
        };
        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.sub, "reader");
        assert_eq!(decoded.role, Role::Member);

        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn self_or_staff_rule() {
        let member = UserClaims {
            sub: "reader".to_string(),
            user_id: 7,
            role: Role::Member,
            exp: i64::MAX,
            iat: 0,
        };
        assert!(member.require_self_or_staff(7).is_ok());
        assert!(member.require_self_or_staff(8).is_err());

        let librarian = UserClaims {
            role: Role::Librarian,
            ..member.clone()
        };
        assert!(librarian.require_self_or_staff(8).is_ok());
    }
}
