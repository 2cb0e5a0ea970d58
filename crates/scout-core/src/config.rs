//! Retrieval configuration
//!
//! Loaded from `~/.scout/config.toml` when present. Every field has a
//! default, so a partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

/// Files larger than this are never indexed (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Directory names never descended into
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "dist",
    "build",
    "out",
    "target",
    ".next",
    "coverage",
    "__pycache__",
    ".venv",
    "venv",
    "vendor",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Where the document store is persisted
    pub storage_path: PathBuf,
    /// Size ceiling in bytes
    pub max_file_size: u64,
    /// Directory names skipped during enumeration
    pub ignored_dirs: Vec<String>,
    /// Result cap used when assembling context
    pub context_max_results: usize,
    /// Result cap for plain searches when the caller gives none
    pub default_max_results: usize,
    /// Gitignore-style file looked up in each workspace root
    pub ignore_file_name: String,
    /// Files stat'ed and read concurrently during a pass
    pub read_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            storage_path: paths::default_store_path(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            context_max_results: 10,
            default_max_results: 5,
            ignore_file_name: ".scoutignore".to_string(),
            read_concurrency: 8,
        }
    }
}

impl RetrievalConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config.normalized())
    }

    /// Load `~/.scout/config.toml`, or defaults when it does not exist
    pub fn load_or_default() -> Result<Self> {
        let path = paths::config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }

    fn normalized(mut self) -> Self {
        self.read_concurrency = self.read_concurrency.max(1);
        self
    }
}
