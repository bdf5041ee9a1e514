//! Configuration types for Metrix
//!
//! This module defines the configuration used to open an index store.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Index store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexStoreConfig {
    /// Location of the redb database file
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// What to do with entries that fail to decode while loading
    #[serde(default)]
    pub load_policy: LoadPolicy,
    /// Create missing parent directories on open
    #[serde(default = "default_create_parent_dirs")]
    pub create_parent_dirs: bool,
}

impl Default for IndexStoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            load_policy: LoadPolicy::default(),
            create_parent_dirs: default_create_parent_dirs(),
        }
    }
}

impl IndexStoreConfig {
    /// Create config with a database path
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load config from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Configuration(e.to_string()))
    }
}

/// Policy for records that fail to decode during a load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Skip the entry, keep loading, report it afterwards
    #[default]
    SkipCorrupt,
    /// Fail the whole load on the first corrupt entry
    Abort,
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/index.redb")
}

fn default_create_parent_dirs() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = IndexStoreConfig::default();
        assert_eq!(config.path, PathBuf::from("./data/index.redb"));
        assert_eq!(config.load_policy, LoadPolicy::SkipCorrupt);
        assert!(config.create_parent_dirs);
    }

    #[test]
    fn test_config_from_toml() {
        let config = IndexStoreConfig::from_toml_str(
            r#"
            path = "/var/lib/metrix/index.redb"
            load_policy = "abort"
            "#,
        )
        .unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/metrix/index.redb"));
        assert_eq!(config.load_policy, LoadPolicy::Abort);
        assert!(config.create_parent_dirs);
    }

    #[test]
    fn test_config_from_empty_toml() {
        let config = IndexStoreConfig::from_toml_str("").unwrap();
        assert_eq!(config.load_policy, LoadPolicy::SkipCorrupt);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "path = \"index.redb\"").unwrap();
        writeln!(file, "create_parent_dirs = false").unwrap();

        let config = IndexStoreConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.path, PathBuf::from("index.redb"));
        assert!(!config.create_parent_dirs);
    }

    #[test]
    fn test_config_invalid() {
        let err = IndexStoreConfig::from_toml_str("load_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = IndexStoreConfig::from_toml_file("/nonexistent/metrix.toml").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
