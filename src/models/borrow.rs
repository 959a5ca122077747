//! Borrow record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::proto;

/// One borrow of one book; open while `returned_at` is null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BorrowRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

impl From<BorrowRecord> for proto::book::BorrowRecord {
    fn from(record: BorrowRecord) -> Self {
        Self {
            id: record.id.to_string(),
            book_id: record.book_id.to_string(),
            user_id: record.user_id.to_string(),
            borrowed_at: record.borrowed_at.to_rfc3339(),
            returned_at: record
                .returned_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}
