//! Sibling-service lookups used for caller resolution and foreign keys

pub mod grpc;

use async_trait::async_trait;
use tonic::metadata::AsciiMetadataValue;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    proto,
};

pub use grpc::{GrpcAuthorDirectory, GrpcCategoryDirectory, GrpcUserDirectory};

/// Authenticated caller, attached to each request by the auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    /// Raw `authorization` value, forwarded on sibling calls
    pub authorization: String,
}

impl Caller {
    /// Wrap `message` in a request carrying the caller's token
    pub fn forward<T>(&self, message: T) -> AppResult<tonic::Request<T>> {
        let value: AsciiMetadataValue = self
            .authorization
            .parse()
            .map_err(|_| AppError::Authentication("Invalid authorization metadata".to_string()))?;

        let mut request = tonic::Request::new(message);
        request.metadata_mut().insert("authorization", value);
        Ok(request)
    }
}

/// Minimal user record returned by the user service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl TryFrom<proto::user::User> for UserSummary {
    type Error = AppError;

    fn try_from(user: proto::user::User) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&user.id)
            .map_err(|_| AppError::Internal(format!("User service returned malformed id {:?}", user.id)))?;
        Ok(Self {
            id,
            name: user.name,
            email: user.email,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve the caller's own user row; unresolvable callers are
    /// `Authentication` errors
    async fn current_user(&self, caller: &Caller) -> AppResult<UserSummary>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorDirectory: Send + Sync {
    async fn get_author(&self, caller: &Caller, id: Uuid) -> AppResult<proto::author::Author>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn get_category(&self, caller: &Caller, id: Uuid) -> AppResult<proto::category::Category>;
}
