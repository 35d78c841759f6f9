//! Per-user serialization locks
//!
//! Every ledger-mutating operation holds the owning user's lock for its
//! whole read-modify-write, so concurrent accrual, purchase and withdrawal
//! traffic against the same wallet cannot lose updates. Locks are acquired
//! one at a time; an operation that touches two users' ledgers (purchase
//! crediting a referrer) releases the first lock before taking the second.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-user async locks
#[derive(Debug, Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one user, creating it on first use. The guard
    /// releases on drop.
    pub async fn acquire(&self, user: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(user.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
