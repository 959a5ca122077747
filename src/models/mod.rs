//! Data models for the catalog services

pub mod author;
pub mod book;
pub mod borrow;
pub mod category;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use borrow::BorrowRecord;
pub use category::Category;
pub use user::{TokenClaims, User};

/// Wire messages use empty strings for "not provided"
pub(crate) fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
