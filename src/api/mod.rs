//! gRPC handlers, authentication layer and health probes

pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod health;
pub mod users;

use uuid::Uuid;

use crate::{
    clients::Caller,
    error::{AppError, AppResult},
};

pub use auth::AuthLayer;
pub use authors::AuthorHandler;
pub use books::BookHandler;
pub use categories::CategoryHandler;
pub use users::UserHandler;

/// Identity attached by [`AuthLayer`]
pub fn caller<T>(request: &tonic::Request<T>) -> AppResult<Caller> {
    request
        .extensions()
        .get::<Caller>()
        .cloned()
        .ok_or_else(|| AppError::Authentication("Missing caller identity".to_string()))
}

/// Parse a wire id; empty and malformed ids are validation errors
pub fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation(format!("{} id is required", what)));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {} id: {}", what, raw)))
}

/// Like [`parse_id`], but an empty id means "not provided"
pub fn parse_optional_id(raw: &str, what: &str) -> AppResult<Option<Uuid>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_id(raw, what).map(Some)
}
