//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::proto;

/// Full book model from database; also the cached representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub is_borrowed: bool,
    /// Total borrow events, never decremented
    pub borrows: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Clone, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 255, message = "Book name cannot be empty"))]
    pub name: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub created_by: Uuid,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Validate)]
pub struct BookChanges {
    #[validate(length(min = 1, max = 255, message = "Book name cannot be empty"))]
    pub name: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.author_id.is_none() && self.category_id.is_none()
    }
}

impl From<Book> for proto::book::Book {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.to_string(),
            name: book.name,
            author_id: book.author_id.to_string(),
            category_id: book.category_id.to_string(),
            is_borrowed: book.is_borrowed,
            borrows: book.borrows,
            created_by: book.created_by.to_string(),
            created_at: book.created_at.to_rfc3339(),
            updated_at: book.updated_at.to_rfc3339(),
        }
    }
}
