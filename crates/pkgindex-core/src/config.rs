//! Configuration for pkgindex services
//!
//! Configuration is layered: defaults, then a TOML file, then environment
//! variables prefixed with `PKGINDEX_`. Every layer is validated before use.

use crate::errors::{PkgIndexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PKGINDEX_";

/// Default lock namespace for journal sequencing
pub const DEFAULT_LOCK_NAMESPACE: &str = "journals";

/// Default lock key for journal sequencing
pub const DEFAULT_LOCK_KEY: i64 = 42;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PkgIndexConfig {
    /// Journal sequencing settings
    pub journal: JournalConfig,
}

/// Journal sequencing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// Namespace half of the advisory lock key
    pub lock_namespace: String,
    /// Numeric half of the advisory lock key
    pub lock_key: i64,
    /// Deadline for acquiring the lock; `None` blocks until it is free
    pub lock_timeout_ms: Option<u64>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            lock_namespace: DEFAULT_LOCK_NAMESPACE.to_string(),
            lock_key: DEFAULT_LOCK_KEY,
            lock_timeout_ms: None,
        }
    }
}

impl JournalConfig {
    /// Lock deadline as a [`Duration`]
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}

impl PkgIndexConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PkgIndexError::configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `PKGINDEX_*` environment overrides.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from an explicit set of variables.
    pub fn merge_with_vars(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<()> {
        for (key, value) in vars {
            let Some(config_key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            self.set_from_string(&config_key.to_lowercase(), &value)?;
        }
        self.validate()
    }

    /// Set one value by its flattened key (`journal_lock_key`, ...).
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "journal_lock_namespace" => {
                self.journal.lock_namespace = value.to_string();
            }
            "journal_lock_key" => {
                self.journal.lock_key = value.parse().map_err(|e| {
                    PkgIndexError::configuration(format!("invalid journal lock key {value:?}: {e}"))
                })?;
            }
            "journal_lock_timeout_ms" => {
                self.journal.lock_timeout_ms = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|e| {
                        PkgIndexError::configuration(format!(
                            "invalid journal lock timeout {value:?}: {e}"
                        ))
                    })?)
                };
            }
            other => {
                tracing::warn!(key = other, "ignoring unknown configuration override");
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.journal.lock_namespace.trim().is_empty() {
            return Err(PkgIndexError::configuration(
                "journal.lock_namespace must not be empty",
            ));
        }
        if self.journal.lock_timeout_ms == Some(0) {
            return Err(PkgIndexError::configuration(
                "journal.lock_timeout_ms must be positive when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PkgIndexConfig::default();
        assert_eq!(config.journal.lock_namespace, "journals");
        assert_eq!(config.journal.lock_key, 42);
        assert_eq!(config.journal.lock_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PkgIndexConfig::from_toml_str("[journal]\nlock_timeout_ms = 250\n").unwrap();
        assert_eq!(config.journal.lock_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.journal.lock_key, DEFAULT_LOCK_KEY);
    }

    #[test]
    fn test_unknown_field_is_configuration_error() {
        let err = PkgIndexConfig::from_toml_str("[journal]\nlock_timout = 5\n").unwrap_err();
        assert!(matches!(err, PkgIndexError::Configuration { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = PkgIndexConfig::from_toml_str("[journal]\nlock_timeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, PkgIndexError::Configuration { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[journal]\nlock_namespace = \"audit\"\nlock_key = 7").unwrap();
        let config = PkgIndexConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.journal.lock_namespace, "audit");
        assert_eq!(config.journal.lock_key, 7);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PkgIndexConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, PkgIndexError::Configuration { .. }));
    }

    #[test]
    fn test_merge_with_vars() {
        let mut config = PkgIndexConfig::default();
        config
            .merge_with_vars([
                ("PKGINDEX_JOURNAL_LOCK_TIMEOUT_MS".to_string(), "1500".to_string()),
                ("PKGINDEX_JOURNAL_LOCK_KEY".to_string(), "99".to_string()),
                ("HOME".to_string(), "/root".to_string()),
            ])
            .unwrap();
        assert_eq!(config.journal.lock_timeout_ms, Some(1500));
        assert_eq!(config.journal.lock_key, 99);
    }

    #[test]
    fn test_merge_with_bad_number_fails() {
        let mut config = PkgIndexConfig::default();
        let err = config
            .merge_with_vars([(
                "PKGINDEX_JOURNAL_LOCK_KEY".to_string(),
                "forty-two".to_string(),
            )])
            .unwrap_err();
        assert!(matches!(err, PkgIndexError::Configuration { .. }));
    }

    #[test]
    #[serial]
    fn test_merge_with_env() {
        std::env::set_var("PKGINDEX_JOURNAL_LOCK_NAMESPACE", "journals-test");
        let mut config = PkgIndexConfig::default();
        let result = config.merge_with_env();
        std::env::remove_var("PKGINDEX_JOURNAL_LOCK_NAMESPACE");
        result.unwrap();
        assert_eq!(config.journal.lock_namespace, "journals-test");
    }
}
