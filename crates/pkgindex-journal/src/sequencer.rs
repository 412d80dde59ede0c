//! Journal sequencing
//!
//! Journal ids are drawn from a sequence when a row is inserted, but rows
//! become visible when their transaction commits. Two writers can therefore
//! insert in one order and commit in the other, and a reader that has seen
//! serial `n` would miss the entry with serial `n - 1` that committed later.
//!
//! The sequencer closes that gap: before a transaction inserts its first
//! journal row it takes one fixed, exclusive advisory lock and keeps it until
//! the transaction ends. From the first journal insert to commit, journal
//! writers run one at a time, so id order equals commit order. Work a
//! transaction does before its first journal insert is not serialized.

use crate::lock::{AdvisoryLockRegistry, LockGuard, LockKey, TransactionId};
use pkgindex_core::{JournalConfig, PkgIndexResult};
use std::sync::Arc;
use std::time::Duration;

/// Per-transaction sequencing state: the guard, once acquired.
#[derive(Debug, Default)]
pub struct SequencingScope {
    guard: Option<LockGuard>,
}

impl SequencingScope {
    /// Whether this transaction holds the sequencing lock
    pub fn holds_lock(&self) -> bool {
        self.guard.is_some()
    }

    /// Release the lock, if held. Called when the transaction ends.
    pub(crate) fn release(&mut self) {
        self.guard = None;
    }
}

/// Serializes journal-writing transactions through one named lock.
#[derive(Debug, Clone)]
pub struct JournalSequencer {
    locks: Arc<AdvisoryLockRegistry>,
    key: LockKey,
    timeout: Option<Duration>,
}

impl JournalSequencer {
    /// Create a sequencer over `locks` using the configured key and deadline.
    pub fn new(locks: Arc<AdvisoryLockRegistry>, config: &JournalConfig) -> Self {
        Self {
            locks,
            key: LockKey::new(config.lock_namespace.clone(), config.lock_key),
            timeout: config.lock_timeout(),
        }
    }

    /// Lock key this sequencer serializes on
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    /// Lock registry shared with other writers
    pub fn locks(&self) -> &Arc<AdvisoryLockRegistry> {
        &self.locks
    }

    /// Must be called before every journal insert of `txn`.
    ///
    /// The first call blocks until the sequencing lock is free and stores the
    /// guard in `scope`; later calls for the same transaction return at once.
    pub fn record_intent(&self, txn: TransactionId, scope: &mut SequencingScope) -> PkgIndexResult<()> {
        if scope.holds_lock() {
            return Ok(());
        }
        let guard = self.locks.acquire(&self.key, txn, self.timeout)?;
        scope.guard = Some(guard);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer(timeout_ms: Option<u64>) -> JournalSequencer {
        let config = JournalConfig {
            lock_timeout_ms: timeout_ms,
            ..JournalConfig::default()
        };
        JournalSequencer::new(Arc::new(AdvisoryLockRegistry::new()), &config)
    }

    #[test]
    fn test_record_intent_is_idempotent_within_transaction() {
        let sequencer = sequencer(None);
        let txn = TransactionId::next();
        let mut scope = SequencingScope::default();
        sequencer.record_intent(txn, &mut scope).unwrap();
        sequencer.record_intent(txn, &mut scope).unwrap();
        assert!(scope.holds_lock());
        assert_eq!(sequencer.locks().holder(sequencer.key()), Some(txn));
    }

    #[test]
    fn test_release_frees_lock_for_next_transaction() {
        let sequencer = sequencer(Some(20));
        let mut first = SequencingScope::default();
        sequencer
            .record_intent(TransactionId::next(), &mut first)
            .unwrap();

        let mut second = SequencingScope::default();
        let err = sequencer
            .record_intent(TransactionId::next(), &mut second)
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!second.holds_lock());

        first.release();
        sequencer
            .record_intent(TransactionId::next(), &mut second)
            .unwrap();
        assert!(second.holds_lock());
    }

    #[test]
    fn test_key_comes_from_config() {
        let sequencer = sequencer(None);
        assert_eq!(sequencer.key(), &LockKey::new("journals", 42));
    }
}
