//! In-memory journal table
//!
//! Models the two properties of the persisted journal that sequencing depends
//! on: ids come from a sequence consumed at insert time (and are lost on
//! rollback, like a SERIAL column), and rows only become visible at commit.
//! Committed rows are kept in commit order, which is what lets tests compare
//! id order with commit order.

use crate::entry::{JournalEntry, JournalId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct CommittedRows {
    in_commit_order: Vec<JournalEntry>,
    last_serial: Option<JournalId>,
    last_serials: HashMap<String, JournalId>,
}

/// Append-only journal storage.
#[derive(Debug)]
pub struct JournalTable {
    sequence: AtomicU64,
    committed: RwLock<CommittedRows>,
}

impl Default for JournalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalTable {
    /// Empty table; the first id handed out is 1.
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(1),
            committed: RwLock::new(CommittedRows::default()),
        }
    }

    /// Consume the next sequence value.
    pub(crate) fn next_id(&self) -> JournalId {
        JournalId(self.sequence.fetch_add(1, Ordering::SeqCst))
    }

    /// Make a transaction's rows visible, in one step.
    pub(crate) fn commit_rows(&self, rows: Vec<JournalEntry>) {
        let mut committed = self.committed.write();
        for row in rows {
            committed.last_serial = committed.last_serial.max(Some(row.id()));
            if let Some(name) = row.name() {
                let serial = committed
                    .last_serials
                    .entry(name.to_string())
                    .or_insert(row.id());
                if row.id() > *serial {
                    *serial = row.id();
                }
            }
            committed.in_commit_order.push(row);
        }
    }

    /// Highest committed serial.
    pub fn last_serial(&self) -> Option<JournalId> {
        self.committed.read().last_serial
    }

    /// Highest committed serial for one project name.
    pub fn last_serial_for(&self, name: &str) -> Option<JournalId> {
        self.committed.read().last_serials.get(name).copied()
    }

    /// Committed entries with an id greater than `serial`, ordered by id.
    pub fn changelog_since(&self, serial: JournalId) -> Vec<JournalEntry> {
        let mut entries: Vec<JournalEntry> = self
            .committed
            .read()
            .in_commit_order
            .iter()
            .filter(|entry| entry.id() > serial)
            .cloned()
            .collect();
        entries.sort_by_key(JournalEntry::id);
        entries
    }

    /// Committed entries for one project name, ordered by id.
    pub fn entries_for(&self, name: &str) -> Vec<JournalEntry> {
        let mut entries: Vec<JournalEntry> = self
            .committed
            .read()
            .in_commit_order
            .iter()
            .filter(|entry| entry.name() == Some(name))
            .cloned()
            .collect();
        entries.sort_by_key(JournalEntry::id);
        entries
    }

    /// Ids of committed entries in the order their transactions committed.
    pub fn commit_order(&self) -> Vec<JournalId> {
        self.committed
            .read()
            .in_commit_order
            .iter()
            .map(JournalEntry::id)
            .collect()
    }

    /// Number of committed entries
    pub fn len(&self) -> usize {
        self.committed.read().in_commit_order.len()
    }

    /// Whether nothing has been committed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
