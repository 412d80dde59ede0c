//! Append-only audit journal for pkgindex
//!
//! Journal serials are consumed by readers as a changelog cursor ("give me
//! everything after serial n"), which only works if serials are handed out in
//! commit order. This crate guarantees that with a transaction-scoped
//! advisory lock taken on a transaction's first journal insert.
//!
//! # Architecture
//!
//! - **Entries**: `NewJournalEntry` (no id) becomes a `JournalEntry` on insert
//! - **Locks**: `AdvisoryLockRegistry` of named exclusive locks, released by guard drop
//! - **Sequencer**: `JournalSequencer::record_intent`, called before every insert
//! - **Journal**: `Journal` handle and `JournalTransaction` with commit/rollback
//! - **Table**: committed rows plus changelog queries

#![forbid(unsafe_code)]

/// Journal entry records
pub mod entry;

/// Transactional journal handle
pub mod journal;

/// Named advisory locks
pub mod lock;

/// Commit-order sequencing
pub mod sequencer;

/// Committed row storage
pub mod table;

pub use entry::{JournalEntry, JournalId, NewJournalEntry};
pub use journal::{Journal, JournalTransaction};
pub use lock::{AdvisoryLockRegistry, LockGuard, LockKey, TransactionId};
pub use sequencer::{JournalSequencer, SequencingScope};
pub use table::JournalTable;
