//! Borrow and return of books.
//!
//! Borrow takes an advisory lock in the cache before opening the store
//! transaction, so concurrent attempts on a hot book fail fast with
//! `Locked` instead of queueing on the row lock. The row lock inside the
//! transaction is what keeps the book and its borrow records consistent;
//! when the cache is unreachable the lock is skipped and the row lock alone
//! serializes the attempts.

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use super::{
    cache::{invalidate_book, lock_key, Cache},
    lock::AdvisoryLock,
};
use crate::{
    error::{AppError, AppResult},
    models::BorrowRecord,
    repository::BookStore,
};

#[derive(Clone)]
pub struct CirculationService {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn Cache>,
    lock: AdvisoryLock,
}

impl CirculationService {
    pub fn new(store: Arc<dyn BookStore>, cache: Arc<dyn Cache>, lock_ttl: Duration) -> Self {
        Self {
            lock: AdvisoryLock::new(cache.clone(), lock_ttl),
            store,
            cache,
        }
    }

    /// Borrow `book_id` for `user_id`
    pub async fn borrow(&self, book_id: Uuid, user_id: Uuid) -> AppResult<BorrowRecord> {
        let guard = match self
            .lock
            .acquire(lock_key(book_id), user_id.to_string())
            .await
        {
            Ok(Some(guard)) => Some(guard),
            Ok(None) => {
                tracing::debug!(%book_id, %user_id, "Borrow refused, lock held");
                return Err(AppError::Locked(format!(
                    "Book {} is being borrowed by another request",
                    book_id
                )));
            }
            Err(e) => {
                tracing::warn!(%book_id, error = %e, "Advisory lock unavailable, relying on row lock");
                None
            }
        };

        let result = self.store.borrow(book_id, user_id).await;

        if let Some(guard) = guard {
            guard.release().await;
        }

        let record = result?;
        tracing::info!(%book_id, %user_id, record_id = %record.id, "Book borrowed");

        invalidate_book(self.cache.as_ref(), book_id).await;
        Ok(record)
    }

    /// Return the caller's open borrow of `book_id`
    pub async fn return_book(&self, book_id: Uuid, user_id: Uuid) -> AppResult<BorrowRecord> {
        let record = self.store.return_book(book_id, user_id).await?;
        tracing::info!(%book_id, %user_id, record_id = %record.id, "Book returned");

        invalidate_book(self.cache.as_ref(), book_id).await;
        Ok(record)
    }
}
