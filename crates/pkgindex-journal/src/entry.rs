//! Journal entry records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Journal serial. Assigned by the journal sequence, never by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalId(pub u64);

impl JournalId {
    /// Raw serial value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A journal entry not yet inserted; it has no id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewJournalEntry {
    name: Option<String>,
    version: Option<String>,
    action: Option<String>,
    submitted_by: Option<String>,
    submitted_date: Option<DateTime<Utc>>,
}

impl NewJournalEntry {
    /// Entry about a project (and optionally a release of it).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Release version the entry refers to
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Free-form action text, e.g. `"new release"` or `"remove project"`
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Username of the submitter
    pub fn submitted_by(mut self, username: impl Into<String>) -> Self {
        self.submitted_by = Some(username.into());
        self
    }

    /// Explicit submission time; defaults to the insert time.
    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_date = Some(at);
        self
    }

    pub(crate) fn into_entry(self, id: JournalId) -> JournalEntry {
        JournalEntry {
            id,
            name: self.name,
            version: self.version,
            action: self.action,
            submitted_date: self.submitted_date.unwrap_or_else(Utc::now),
            submitted_by: self.submitted_by,
        }
    }
}

/// An inserted journal entry. Entries are append-only and have no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    id: JournalId,
    name: Option<String>,
    version: Option<String>,
    action: Option<String>,
    submitted_date: DateTime<Utc>,
    submitted_by: Option<String>,
}

impl JournalEntry {
    /// Serial
    pub fn id(&self) -> JournalId {
        self.id
    }

    /// Project name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Release version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Action text
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Submission time
    pub fn submitted_date(&self) -> DateTime<Utc> {
        self.submitted_date
    }

    /// Submitter username
    pub fn submitted_by(&self) -> Option<&str> {
        self.submitted_by.as_deref()
    }
}
