//! Well-known locations under `~/.scout`

use std::path::PathBuf;

/// Root directory for Scout state
pub fn scout_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scout")
}

/// Default location of the durable document store
pub fn default_store_path() -> PathBuf {
    scout_dir().join("index.json")
}

/// Default location of the user configuration file
pub fn config_path() -> PathBuf {
    scout_dir().join("config.toml")
}
