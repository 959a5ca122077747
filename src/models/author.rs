//! Author model and related types

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::proto;

/// Full author model from database
#[derive(Debug, Clone, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create or rename author request
#[derive(Debug, Validate)]
pub struct AuthorName {
    #[validate(length(min = 1, max = 255, message = "Author name cannot be empty"))]
    pub name: String,
}

impl AuthorName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }
}

impl From<Author> for proto::author::Author {
    fn from(author: Author) -> Self {
        Self {
            id: author.id.to_string(),
            name: author.name,
            created_by: author.created_by.to_string(),
            created_at: author.created_at.to_rfc3339(),
            updated_at: author.updated_at.to_rfc3339(),
        }
    }
}
