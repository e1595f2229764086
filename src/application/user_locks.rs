//! Per-user serialization of read-modify-write sequences.
//!
//! The store only offers whole-record `put`, so two concurrent updates for
//! one user can interleave their get/put pairs and drop a write. Holding the
//! user's lock across the pair serializes them within this process. Writers
//! in other processes are not covered and stay last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::UserId;

/// Guard held for the duration of one user's read-modify-write.
pub type UserLockGuard = OwnedMutexGuard<()>;

#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`.
    ///
    /// Entries nobody holds or waits on are pruned on each call, so the map
    /// only grows with concurrency, not with the number of users seen.
    pub async fn lock(&self, user_id: &UserId) -> UserLockGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(user_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of users with a held or awaited lock.
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = Arc::new(UserLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    let _guard = locks.lock(&uid("u1")).await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let locks = UserLocks::new();
        let _a = locks.lock(&uid("a")).await;

        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(&uid("b"))).await;

        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = UserLocks::new();
        {
            let _guard = locks.lock(&uid("a")).await;
            assert_eq!(locks.active(), 1);
        }
        let _other = locks.lock(&uid("b")).await;

        assert_eq!(locks.active(), 1);
        assert_eq!(locks.locks.lock().unwrap().len(), 1);
    }
}
