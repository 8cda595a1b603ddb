//! Per-post single-flight locking.
//!
//! Runs for the same post share one working directory, so they are
//! serialized within the process. Runs for different posts proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Guard held for the duration of a run.
pub type PostLockGuard = OwnedMutexGuard<()>;

/// Registry of per-post locks.
#[derive(Debug, Default)]
pub struct PostLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PostLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other run holds `post_id`, then take it.
    pub async fn acquire(&self, post_id: &str) -> PostLockGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the registry references are neither held nor awaited.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(post_id.to_string()).or_default().clone()
        };

        if lock.try_lock().is_err() {
            debug!(post_id = %post_id, "Waiting for in-flight run on the same post");
        }
        lock.lock_owned().await
    }

    /// Number of posts with a held or awaited lock.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_post_is_serialized() {
        let locks = Arc::new(PostLocks::new());
        let guard = locks.acquire("ABC").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("ABC").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_posts_do_not_block() {
        let locks = PostLocks::new();
        let _a = locks.acquire("A").await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.acquire("B"))
            .await
            .unwrap();

        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = PostLocks::new();
        drop(locks.acquire("A").await);
        drop(locks.acquire("B").await);

        assert_eq!(locks.active(), 0);
        let _c = locks.acquire("C").await;
        assert_eq!(locks.locks.lock().unwrap().len(), 1);
    }
}
