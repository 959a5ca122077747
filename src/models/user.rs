//! User model, registration payloads and token claims

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::non_empty;
use crate::proto;

/// Full user model from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Registration request
#[derive(Debug, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Self-service profile update; `None` keeps the stored value
#[derive(Debug, Default, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl From<proto::user::RegisterRequest> for RegisterUser {
    fn from(request: proto::user::RegisterRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            password: request.password,
        }
    }
}

impl From<proto::user::User> for UpdateUser {
    fn from(request: proto::user::User) -> Self {
        Self {
            name: non_empty(request.name),
            email: non_empty(request.email),
        }
    }
}

impl From<User> for proto::user::User {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// JWT claims carried by bearer tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Caller user id
    pub id: String,
    /// Expiration, seconds since the epoch
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        Self {
            id: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// Sign the claims with HMAC-SHA256
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a token; only HS256 is accepted and `exp` is required
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(token_data.claims)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.id).ok()
    }
}
