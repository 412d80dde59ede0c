//! Transactional journal
//!
//! [`Journal`] is a cloneable handle over the journal table and its
//! sequencer. Writers open a [`JournalTransaction`], insert entries and then
//! commit or roll back. Every insert goes through
//! [`JournalSequencer::record_intent`] first, so the sequencing lock is held
//! from a transaction's first journal insert until it ends.

use crate::entry::{JournalEntry, JournalId, NewJournalEntry};
use crate::lock::{AdvisoryLockRegistry, TransactionId};
use crate::sequencer::{JournalSequencer, SequencingScope};
use crate::table::JournalTable;
use pkgindex_core::{PkgIndexConfig, PkgIndexError, PkgIndexResult};
use std::sync::Arc;

#[derive(Debug)]
struct JournalInner {
    table: JournalTable,
    sequencer: JournalSequencer,
}

/// Handle to the journal; clones share the same table and lock.
#[derive(Debug, Clone)]
pub struct Journal {
    inner: Arc<JournalInner>,
}

impl Journal {
    /// Journal with its own lock registry.
    pub fn new(config: &PkgIndexConfig) -> Self {
        Self::with_locks(config, Arc::new(AdvisoryLockRegistry::new()))
    }

    /// Journal sharing a lock registry with other writers.
    pub fn with_locks(config: &PkgIndexConfig, locks: Arc<AdvisoryLockRegistry>) -> Self {
        Self {
            inner: Arc::new(JournalInner {
                table: JournalTable::new(),
                sequencer: JournalSequencer::new(locks, &config.journal),
            }),
        }
    }

    /// Open a transaction.
    pub fn begin(&self) -> JournalTransaction {
        let id = TransactionId::next();
        tracing::trace!(txn = %id, "journal transaction opened");
        JournalTransaction {
            id,
            inner: Arc::clone(&self.inner),
            scope: SequencingScope::default(),
            pending: Vec::new(),
            state: TransactionState::Open,
        }
    }

    /// Insert one entry in its own transaction and commit it.
    pub fn record(&self, entry: NewJournalEntry) -> PkgIndexResult<JournalEntry> {
        let mut txn = self.begin();
        txn.insert(entry)?;
        let mut committed = txn.commit()?;
        committed
            .pop()
            .ok_or_else(|| PkgIndexError::internal("committed transaction returned no entry"))
    }

    /// The sequencer guarding this journal
    pub fn sequencer(&self) -> &JournalSequencer {
        &self.inner.sequencer
    }

    /// Committed rows
    pub fn table(&self) -> &JournalTable {
        &self.inner.table
    }

    /// Highest committed serial
    pub fn last_serial(&self) -> Option<JournalId> {
        self.inner.table.last_serial()
    }

    /// Highest committed serial for one project
    pub fn last_serial_for(&self, name: &str) -> Option<JournalId> {
        self.inner.table.last_serial_for(name)
    }

    /// Committed entries after `serial`, by id
    pub fn changelog_since(&self, serial: JournalId) -> Vec<JournalEntry> {
        self.inner.table.changelog_since(serial)
    }

    /// Committed entries for one project, by id
    pub fn entries_for(&self, name: &str) -> Vec<JournalEntry> {
        self.inner.table.entries_for(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Open,
    /// Lock acquisition failed; only rollback is allowed.
    Poisoned,
    Finished,
}

/// A unit of journal writes that becomes visible atomically on commit.
///
/// Dropping an unfinished transaction rolls it back.
#[derive(Debug)]
pub struct JournalTransaction {
    id: TransactionId,
    inner: Arc<JournalInner>,
    scope: SequencingScope,
    pending: Vec<JournalEntry>,
    state: TransactionState,
}

impl JournalTransaction {
    /// Transaction id
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Whether this transaction holds the sequencing lock
    pub fn holds_sequence_lock(&self) -> bool {
        self.scope.holds_lock()
    }

    /// Entries inserted so far, not yet visible to readers
    pub fn pending(&self) -> &[JournalEntry] {
        &self.pending
    }

    /// Insert an entry, taking the sequencing lock first if needed.
    ///
    /// A lock timeout poisons the transaction: it must be rolled back and
    /// retried from the start.
    pub fn insert(&mut self, entry: NewJournalEntry) -> PkgIndexResult<JournalId> {
        // Commit and rollback consume the transaction, so only Open and
        // Poisoned are observable here.
        if self.state == TransactionState::Poisoned {
            return Err(PkgIndexError::invalid(format!(
                "{} failed to acquire the journal lock and must be rolled back",
                self.id
            )));
        }

        if let Err(err) = self.inner.sequencer.record_intent(self.id, &mut self.scope) {
            self.state = TransactionState::Poisoned;
            return Err(err);
        }

        let id = self.inner.table.next_id();
        self.pending.push(entry.into_entry(id));
        tracing::trace!(txn = %self.id, journal_id = %id, "journal entry inserted");
        Ok(id)
    }

    /// Make all inserted entries visible, then release the lock.
    pub fn commit(mut self) -> PkgIndexResult<Vec<JournalEntry>> {
        if self.state == TransactionState::Poisoned {
            self.finish_rollback();
            return Err(PkgIndexError::invalid(format!(
                "{} failed to acquire the journal lock and was rolled back",
                self.id
            )));
        }
        let rows = std::mem::take(&mut self.pending);
        self.inner.table.commit_rows(rows.clone());
        self.state = TransactionState::Finished;
        self.scope.release();
        if !rows.is_empty() {
            tracing::info!(txn = %self.id, entries = rows.len(), "journal transaction committed");
        }
        Ok(rows)
    }

    /// Discard all inserted entries and release the lock.
    pub fn rollback(mut self) {
        self.finish_rollback();
    }

    fn finish_rollback(&mut self) {
        if self.state == TransactionState::Finished {
            return;
        }
        let discarded = self.pending.len();
        self.pending.clear();
        self.state = TransactionState::Finished;
        self.scope.release();
        if discarded > 0 {
            tracing::warn!(txn = %self.id, discarded, "journal transaction rolled back");
        } else {
            tracing::trace!(txn = %self.id, "journal transaction rolled back");
        }
    }
}

impl Drop for JournalTransaction {
    fn drop(&mut self) {
        self.finish_rollback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal() -> Journal {
        Journal::new(&PkgIndexConfig::default())
    }

    #[test]
    fn test_record_commits_single_entry() {
        let journal = journal();
        let entry = journal
            .record(NewJournalEntry::new("alpha").action("create"))
            .unwrap();
        assert_eq!(journal.last_serial(), Some(entry.id()));
        assert_eq!(journal.sequencer().locks().holder(journal.sequencer().key()), None);
    }

    #[test]
    fn test_multiple_inserts_take_lock_once() {
        let journal = journal();
        let mut txn = journal.begin();
        let first = txn.insert(NewJournalEntry::new("alpha").action("create")).unwrap();
        let second = txn
            .insert(NewJournalEntry::new("alpha").version("1.0").action("new release"))
            .unwrap();
        assert!(first < second);
        assert!(txn.holds_sequence_lock());
        let committed = txn.commit().unwrap();
        assert_eq!(committed.len(), 2);
        assert_eq!(journal.last_serial_for("alpha"), Some(second));
    }

    #[test]
    fn test_transaction_without_journal_writes_never_locks() {
        let journal = journal();
        let txn = journal.begin();
        assert!(!txn.holds_sequence_lock());
        assert!(txn.commit().unwrap().is_empty());
    }

    #[test]
    fn test_rollback_discards_and_releases() {
        let journal = journal();
        let mut txn = journal.begin();
        txn.insert(NewJournalEntry::new("alpha")).unwrap();
        txn.rollback();
        assert!(journal.table().is_empty());
        assert_eq!(journal.sequencer().locks().holder(journal.sequencer().key()), None);
    }

    #[test]
    fn test_insert_after_lock_timeout_is_rejected_until_rollback() {
        let mut config = PkgIndexConfig::default();
        config.journal.lock_timeout_ms = Some(10);
        let locks = Arc::new(AdvisoryLockRegistry::new());
        let journal = Journal::with_locks(&config, Arc::clone(&locks));
        let blocker = locks
            .acquire(journal.sequencer().key(), TransactionId::next(), None)
            .unwrap();

        let mut txn = journal.begin();
        assert!(txn.insert(NewJournalEntry::new("alpha")).unwrap_err().is_retryable());
        let err = txn.insert(NewJournalEntry::new("alpha")).unwrap_err();
        assert!(matches!(err, PkgIndexError::Invalid { .. }));
        assert!(txn.pending().is_empty());
        txn.rollback();

        drop(blocker);
        journal.record(NewJournalEntry::new("alpha")).unwrap();
    }

    #[test]
    fn test_drop_rolls_back() {
        let journal = journal();
        {
            let mut txn = journal.begin();
            txn.insert(NewJournalEntry::new("alpha")).unwrap();
        }
        assert!(journal.table().is_empty());
        // The lock is free again.
        journal.record(NewJournalEntry::new("beta")).unwrap();
    }
}
