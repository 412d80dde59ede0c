//! Named, transaction-scoped exclusive locks
//!
//! A process-wide registry of advisory locks keyed by `(namespace, key)`.
//! A lock is held by one transaction at a time and released when the
//! [`LockGuard`] returned from [`AdvisoryLockRegistry::acquire`] is dropped,
//! which the journal ties to commit or rollback.
//!
//! ## Lock Usage
//!
//! Each slot is a `parking_lot::Mutex<Option<TransactionId>>` plus a
//! `Condvar`. The guard holds no mutex guard and is `Send`.

use parking_lot::{Condvar, Mutex};
use pkgindex_core::{PkgIndexError, PkgIndexResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifier of one journal transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Allocate the next process-unique transaction id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// Key of an advisory lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockKey {
    /// Namespace, conventionally the protected table
    pub namespace: String,
    /// Numeric key inside the namespace
    pub key: i64,
}

impl LockKey {
    /// Create a key
    pub fn new(namespace: impl Into<String>, key: i64) -> Self {
        Self {
            namespace: namespace.into(),
            key,
        }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

#[derive(Debug, Default)]
struct LockSlot {
    holder: Mutex<Option<TransactionId>>,
    released: Condvar,
}

/// Registry of advisory locks shared by every writer in the process.
#[derive(Debug, Default)]
pub struct AdvisoryLockRegistry {
    slots: Mutex<HashMap<LockKey, Arc<LockSlot>>>,
}

impl AdvisoryLockRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &LockKey) -> Arc<LockSlot> {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Block until `key` is free, then hold it for `holder`.
    ///
    /// With a `timeout`, gives up after it elapses with a retryable
    /// [`PkgIndexError::LockTimeout`]. Asking again for a lock `holder`
    /// already has is a no-op: it returns at once with a nested guard that
    /// leaves the lock held when dropped.
    pub fn acquire(
        &self,
        key: &LockKey,
        holder: TransactionId,
        timeout: Option<Duration>,
    ) -> PkgIndexResult<LockGuard> {
        let slot = self.slot(key);
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        {
            let mut current = slot.holder.lock();
            if *current == Some(holder) {
                tracing::trace!(lock = %key, txn = %holder, "lock already held");
                return Ok(LockGuard {
                    slot: Arc::clone(&slot),
                    key: key.clone(),
                    holder,
                    nested: true,
                });
            }
            while current.is_some() {
                match deadline {
                    Some(deadline) => {
                        let waited = slot.released.wait_until(&mut current, deadline);
                        if waited.timed_out() && current.is_some() {
                            tracing::warn!(lock = %key, txn = %holder, "lock acquisition timed out");
                            return Err(PkgIndexError::lock_timeout(format!(
                                "{holder} could not acquire lock {key}"
                            )));
                        }
                    }
                    None => slot.released.wait(&mut current),
                }
            }
            *current = Some(holder);
        }
        tracing::debug!(lock = %key, txn = %holder, "lock acquired");
        Ok(LockGuard {
            slot,
            key: key.clone(),
            holder,
            nested: false,
        })
    }

    /// Current holder of `key`, if any.
    pub fn holder(&self, key: &LockKey) -> Option<TransactionId> {
        let slot = self.slots.lock().get(key).cloned()?;
        let holder = *slot.holder.lock();
        holder
    }
}

/// Proof of holding an advisory lock. Dropping the outermost guard releases
/// the lock.
#[derive(Debug)]
pub struct LockGuard {
    slot: Arc<LockSlot>,
    key: LockKey,
    holder: TransactionId,
    nested: bool,
}

impl LockGuard {
    /// Locked key
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    /// Holding transaction
    pub fn holder(&self) -> TransactionId {
        self.holder
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.nested {
            return;
        }
        {
            let mut current = self.slot.holder.lock();
            if *current == Some(self.holder) {
                *current = None;
            }
        }
        self.slot.released.notify_one();
        tracing::debug!(lock = %self.key, txn = %self.holder, "lock released");
    }
}
