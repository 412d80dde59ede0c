//! Unified error system for pkgindex
//!
//! One error type is shared by every crate in the workspace. Variants are
//! kinds, not call sites: callers branch on the kind (not found, invalid
//! mutation, retryable lock timeout, configuration) and read the message for
//! detail.

use serde::{Deserialize, Serialize};

/// Unified error type for all pkgindex operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PkgIndexError {
    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Lookup against a collaborator found nothing
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Attempt to set a value that is only ever derived
    #[error("Invalid mutation: {message}")]
    InvalidMutation {
        /// Error message naming the rejected mutation
        message: String,
    },

    /// A lock could not be acquired before the caller's deadline
    #[error("Lock timeout: {message}")]
    LockTimeout {
        /// Error message describing the contended lock
        message: String,
    },

    /// Malformed configuration or persisted enumeration value
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl PkgIndexError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid mutation error
    pub fn invalid_mutation(message: impl Into<String>) -> Self {
        Self::InvalidMutation {
            message: message.into(),
        }
    }

    /// Create a lock timeout error
    pub fn lock_timeout(message: impl Into<String>) -> Self {
        Self::LockTimeout {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the operation may succeed if the caller rolls back and retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }

    /// Whether this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Standard Result type for pkgindex operations
pub type Result<T> = std::result::Result<T, PkgIndexError>;

impl From<std::io::Error> for PkgIndexError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PkgIndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PkgIndexError {
    fn from(err: toml::de::Error) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PkgIndexError::not_found("project requests");
        assert!(matches!(err, PkgIndexError::NotFound { .. }));
        assert_eq!(err.to_string(), "Not found: project requests");
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        assert!(PkgIndexError::lock_timeout("journals/42").is_retryable());
        assert!(!PkgIndexError::configuration("bad status").is_retryable());
        assert!(!PkgIndexError::invalid_mutation("normalized_name").is_retryable());
        assert!(!PkgIndexError::not_found("x").is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        assert!(PkgIndexError::from(io_err).is_not_found());

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert!(matches!(
            PkgIndexError::from(io_err),
            PkgIndexError::Storage { .. }
        ));
    }

    #[test]
    fn test_toml_error_is_configuration() {
        let err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        assert!(matches!(
            PkgIndexError::from(err),
            PkgIndexError::Configuration { .. }
        ));
    }
}
