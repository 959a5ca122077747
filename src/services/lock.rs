//! Advisory lock held in the shared cache.
//!
//! The lock only sheds contention. Correctness of borrow and return rests on
//! the row lock taken inside the store transaction.

use std::{sync::Arc, time::Duration};

use super::cache::Cache;
use crate::error::AppResult;

#[derive(Clone)]
pub struct AdvisoryLock {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl AdvisoryLock {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Try once to take `key` for `owner`.
    ///
    /// `Ok(None)` means another holder has it. Errors come from the cache
    /// itself; the caller decides whether to proceed without the lock.
    pub async fn acquire(&self, key: String, owner: String) -> AppResult<Option<LockGuard>> {
        if !self.cache.set_nx_ex(&key, &owner, self.ttl).await? {
            return Ok(None);
        }

        Ok(Some(LockGuard {
            cache: self.cache.clone(),
            key,
            owner,
            released: false,
        }))
    }
}

/// Held lock. Call [`LockGuard::release`]; if the owning future is dropped
/// first, the release is spawned onto the runtime instead.
pub struct LockGuard {
    cache: Arc<dyn Cache>,
    key: String,
    owner: String,
    released: bool,
}

impl LockGuard {
    pub async fn release(mut self) {
        let result = self.cache.delete_if_eq(&self.key, &self.owner).await;
        self.released = true;

        match result {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(key = %self.key, "Advisory lock expired before release");
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to release advisory lock");
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Outside a runtime the TTL reclaims the key.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let cache = self.cache.clone();
        let key = std::mem::take(&mut self.key);
        let owner = std::mem::take(&mut self.owner);
        handle.spawn(async move {
            if let Err(e) = cache.delete_if_eq(&key, &owner).await {
                tracing::warn!(key = %key, error = %e, "Failed to release abandoned advisory lock");
            }
        });
    }
}
