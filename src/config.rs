//! Configuration loading and management.
//!
//! Lookup order: an explicit `--config` file, `.task-folders/config.yaml`,
//! then `~/.task-folders/config.yaml`. Environment variables are applied on
//! top:
//! - `TASK_FOLDERS_DB_PATH` - database path
//! - `TASK_FOLDERS_ROOTS` - scan roots, separated like `PATH`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DB_PATH_ENV: &str = "TASK_FOLDERS_DB_PATH";
pub const ROOTS_ENV: &str = "TASK_FOLDERS_ROOTS";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

/// Store-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".task-folders/tasks.db")
}

/// Scanner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root directories whose immediate children are task folders.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Project-level config file.
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".task-folders/config.yaml")
    }

    /// User-level config file.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".task-folders").join("config.yaml"))
    }

    /// Load from `explicit` if given (errors propagate), otherwise from the
    /// first default location that exists, otherwise defaults. Environment
    /// overrides are applied last.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let candidates = std::iter::once(Self::project_config_path())
                    .chain(Self::user_config_path());
                let mut found = None;
                for candidate in candidates {
                    if candidate.is_file() {
                        debug!(path = %candidate.display(), "Loading config");
                        found = Some(Self::load(&candidate)?);
                        break;
                    }
                }
                found.unwrap_or_default()
            }
        };

        config.apply_env(|key| std::env::var_os(key));
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(db_path) = lookup(DB_PATH_ENV).filter(|v| !v.is_empty()) {
            self.store.db_path = PathBuf::from(db_path);
        }

        if let Some(roots) = lookup(ROOTS_ENV).filter(|v| !v.is_empty()) {
            self.scan.roots = std::env::split_paths(&roots).collect();
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.store.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_fields_missing() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store.db_path, PathBuf::from(".task-folders/tasks.db"));
        assert!(config.scan.roots.is_empty());
    }

    #[test]
    fn load_reads_yaml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "store:\n  db_path: /data/tasks.db\nscan:\n  roots:\n    - /work/a\n    - /work/b\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.db_path, PathBuf::from("/data/tasks.db"));
        assert_eq!(
            config.scan.roots,
            vec![PathBuf::from("/work/a"), PathBuf::from("/work/b")]
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load_or_default(Some(temp.path().join("nope.yaml").as_path())).is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        let roots = std::env::join_paths(["/x", "/y"]).unwrap();
        config.apply_env(|key| match key {
            DB_PATH_ENV => Some(OsString::from("/env/tasks.db")),
            ROOTS_ENV => Some(roots.clone()),
            _ => None,
        });

        assert_eq!(config.store.db_path, PathBuf::from("/env/tasks.db"));
        assert_eq!(config.scan.roots, vec![PathBuf::from("/x"), PathBuf::from("/y")]);
    }

    #[test]
    fn ensure_db_dir_creates_parent() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.store.db_path = temp.path().join("nested/dir/tasks.db");
        config.ensure_db_dir().unwrap();
        assert!(temp.path().join("nested/dir").is_dir());
    }
}
