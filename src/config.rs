//! Configuration management
//!
//! Resolves where the learnings store lives, which adapter queries it and how
//! long a lookup may take. The file is optional and never written.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::replay::format::DEFAULT_BANNER;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Learnings store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Lookup and output settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// How the store is queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreAdapter {
    /// Bundled SQLite, in process
    #[default]
    Embedded,
    /// External `sqlite3` shell
    Sqlite3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store location; `~/` is expanded. Defaults to `~/.pro-workflow/data.db`
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub adapter: StoreAdapter,
    /// Program used by the sqlite3 adapter
    #[serde(default = "default_sqlite3_bin")]
    pub sqlite3_bin: String,
    /// Extra arguments for that program, placed before its output flags
    #[serde(default)]
    pub sqlite3_args: Vec<String>,
}

fn default_sqlite3_bin() -> String {
    "sqlite3".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            adapter: StoreAdapter::default(),
            sqlite3_bin: default_sqlite3_bin(),
            sqlite3_args: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// The store path with defaults and `~` applied
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => expand_home(path),
            None => default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hard bound on a single lookup
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Prefix of the advisory header line
    #[serde(default = "default_banner")]
    pub banner: String,
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_banner() -> String {
    DEFAULT_BANNER.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            banner: default_banner(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load configuration from a specific file, or defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.search.timeout_ms)
    }

    /// Render as TOML, with the store path resolved
    pub fn to_toml(&self) -> Result<String> {
        let mut resolved = self.clone();
        resolved.store.path = Some(self.store.resolved_path());
        toml::to_string_pretty(&resolved).context("Failed to serialize config")
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "pro-workflow", "replay-learnings")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// `~/.pro-workflow/data.db`, relative to the current directory if there is
/// no home directory
pub fn default_store_path() -> PathBuf {
    let relative = Path::new(".pro-workflow").join("data.db");
    match dirs::home_dir() {
        Some(home) => home.join(relative),
        None => relative,
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.timeout_ms, 3000);
        assert_eq!(config.timeout(), Duration::from_millis(3000));
        assert_eq!(config.search.banner, "[ProWorkflow]");
        assert_eq!(config.store.adapter, StoreAdapter::Embedded);
        assert_eq!(config.store.sqlite3_bin, "sqlite3");
        assert!(config.store.resolved_path().ends_with(".pro-workflow/data.db"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.search.timeout_ms, 3000);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[store]\nadapter = \"sqlite3\"\npath = \"/srv/learnings.db\"\n\n[search]\ntimeout_ms = 500\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store.adapter, StoreAdapter::Sqlite3);
        assert_eq!(config.store.resolved_path(), PathBuf::from("/srv/learnings.db"));
        assert_eq!(config.store.sqlite3_bin, "sqlite3");
        assert!(config.store.sqlite3_args.is_empty());
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert_eq!(config.search.banner, "[ProWorkflow]");
    }

    #[test]
    fn test_sqlite3_args() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[store]\nadapter = \"sqlite3\"\nsqlite3_bin = \"/opt/sqlite/bin/sqlite3\"\nsqlite3_args = [\"-readonly\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store.sqlite3_bin, "/opt/sqlite/bin/sqlite3");
        assert_eq!(config.store.sqlite3_args, vec!["-readonly".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ntimeout_ms = \"soon\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let store = StoreConfig {
            path: Some(PathBuf::from("~/notes/learnings.db")),
            ..StoreConfig::default()
        };
        let resolved = store.resolved_path();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolved, home.join("notes/learnings.db"));
        }
    }

    #[test]
    fn test_to_toml_shows_resolved_path() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[store]"));
        assert!(rendered.contains("data.db"));
        assert!(rendered.contains("timeout_ms = 3000"));
    }
}
