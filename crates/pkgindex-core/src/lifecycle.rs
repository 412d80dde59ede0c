//! Project lifecycle states
//!
//! Persisted projects carry a nullable lifecycle status column; `NULL` is the
//! ordinary active state. The column is parsed into a closed enum so every
//! consumer of the state has to handle all variants.

use crate::errors::{PkgIndexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    /// No lifecycle status recorded
    #[default]
    Active,
    /// Project placed in quarantine by an administrator
    QuarantineEnter,
    /// Project released from quarantine
    QuarantineExit,
    /// Project archived by its owners; still listed in the index
    Archived,
    /// Project archived and removed from the simple index
    ArchivedNoindex,
}

impl LifecycleState {
    /// Parse the persisted status column.
    ///
    /// `None` is [`LifecycleState::Active`]. Any string outside the known
    /// statuses is a configuration error; no default is guessed.
    pub fn from_status_column(status: Option<&str>) -> Result<Self> {
        match status {
            None => Ok(Self::Active),
            Some("quarantine-enter") => Ok(Self::QuarantineEnter),
            Some("quarantine-exit") => Ok(Self::QuarantineExit),
            Some("archived") => Ok(Self::Archived),
            Some("archived-noindex") => Ok(Self::ArchivedNoindex),
            Some(other) => Err(PkgIndexError::configuration(format!(
                "unknown lifecycle status {other:?}"
            ))),
        }
    }

    /// Value written back to the status column.
    pub fn as_status_column(&self) -> Option<&'static str> {
        match self {
            Self::Active => None,
            Self::QuarantineEnter => Some("quarantine-enter"),
            Self::QuarantineExit => Some("quarantine-exit"),
            Self::Archived => Some("archived"),
            Self::ArchivedNoindex => Some("archived-noindex"),
        }
    }

    /// Either archived state
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Archived | Self::ArchivedNoindex)
    }

    /// Currently quarantined
    pub fn is_quarantined(&self) -> bool {
        matches!(self, Self::QuarantineEnter)
    }

    /// Whether the project is listed in the simple index
    pub fn is_indexable(&self) -> bool {
        match self {
            Self::Active | Self::QuarantineExit | Self::Archived => true,
            Self::QuarantineEnter | Self::ArchivedNoindex => false,
        }
    }
}

impl FromStr for LifecycleState {
    type Err = PkgIndexError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "active" {
            return Ok(Self::Active);
        }
        Self::from_status_column(Some(s))
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_status_column().unwrap_or("active"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_column_is_active() {
        assert_eq!(
            LifecycleState::from_status_column(None).unwrap(),
            LifecycleState::Active
        );
    }

    #[test]
    fn test_column_roundtrip() {
        for state in [
            LifecycleState::Active,
            LifecycleState::QuarantineEnter,
            LifecycleState::QuarantineExit,
            LifecycleState::Archived,
            LifecycleState::ArchivedNoindex,
        ] {
            let parsed = LifecycleState::from_status_column(state.as_status_column()).unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn test_unknown_status_is_configuration_error() {
        let err = LifecycleState::from_status_column(Some("deleted")).unwrap_err();
        assert!(matches!(err, PkgIndexError::Configuration { .. }));
        // Case matters: the column stores lowercase values only.
        assert!(LifecycleState::from_status_column(Some("Archived")).is_err());
    }

    #[test]
    fn test_visibility_helpers() {
        assert!(LifecycleState::ArchivedNoindex.is_archived());
        assert!(!LifecycleState::ArchivedNoindex.is_indexable());
        assert!(LifecycleState::Archived.is_indexable());
        assert!(LifecycleState::QuarantineEnter.is_quarantined());
        assert!(!LifecycleState::QuarantineExit.is_quarantined());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&LifecycleState::ArchivedNoindex).unwrap();
        assert_eq!(json, "\"archived-noindex\"");
        let state: LifecycleState = serde_json::from_str("\"quarantine-enter\"").unwrap();
        assert_eq!(state, LifecycleState::QuarantineEnter);
    }
}
