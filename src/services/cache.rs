//! Key/value cache seam and key scheme for the book service

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Key holding the unfiltered book list
pub const BOOKS_KEY: &str = "books";

/// Key holding a single book
pub fn book_key(id: Uuid) -> String {
    format!("book:{}", id)
}

/// Marker rewritten by every invalidation of `key`
fn generation_key(key: &str) -> String {
    format!("gen:{}", key)
}

/// Lifetime of generation markers; an expired marker only costs one skipped fill
const GENERATION_TTL: Duration = Duration::from_secs(300);

/// Advisory lock key serializing borrows of one book
pub fn lock_key(id: Uuid) -> String {
    format!("lock:book:{}", id)
}

/// Operations the book service needs from the shared cache
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Set only if absent; returns whether the key was written
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete only if the stored value still equals `value`
    async fn delete_if_eq(&self, key: &str, value: &str) -> AppResult<bool>;
}

/// Read and decode a JSON entry. Undecodable entries count as a miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> AppResult<Option<T>> {
    let Some(raw) = cache.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
            Ok(None)
        }
    }
}

/// Encode and store a JSON entry
pub async fn set_json<T: Serialize + Sync>(
    cache: &dyn Cache,
    key: &str,
    value: &T,
    ttl: Duration,
) -> AppResult<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode cache entry: {}", e)))?;
    cache.set_ex(key, &raw, ttl).await
}

/// Current generation marker of `key`, read before a fill
pub async fn generation(cache: &dyn Cache, key: &str) -> AppResult<Option<String>> {
    cache.get(&generation_key(key)).await
}

/// Store a value read from the store after a miss.
///
/// `seen` is the generation observed before that read. If a write bumped the
/// generation meanwhile, the entry just stored may predate it and is dropped.
/// A write landing after the second check deletes the entry itself.
pub async fn fill_json<T: Serialize + Sync>(
    cache: &dyn Cache,
    key: &str,
    value: &T,
    ttl: Duration,
    seen: Option<String>,
) -> AppResult<()> {
    set_json(cache, key, value, ttl).await?;

    if generation(cache, key).await? != seen {
        tracing::debug!(key, "Write raced cache fill, discarding entry");
        cache.delete(key).await?;
    }
    Ok(())
}

/// Drop the single-book and list entries after a write.
/// The generation is bumped before each delete so in-flight fills notice.
/// Failures only leave stale entries until their TTL, so they are logged.
pub async fn invalidate_book(cache: &dyn Cache, id: Uuid) {
    for key in [book_key(id), BOOKS_KEY.to_string()] {
        let marker = Uuid::new_v4().to_string();
        if let Err(e) = cache
            .set_ex(&generation_key(&key), &marker, GENERATION_TTL)
            .await
        {
            tracing::warn!(key = %key, error = %e, "Failed to bump cache generation");
        }
        if let Err(e) = cache.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }
}
