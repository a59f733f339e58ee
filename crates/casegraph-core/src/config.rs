//! Project and user configuration.
//!
//! Project settings live in `.casegraph/config.toml` under the project
//! root; a missing file means defaults. A user-level file can override the
//! directory stores are kept in, for setups that share one store across
//! checkouts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory under the project root holding config, store, and lock files.
pub const PROJECT_DIR: &str = ".casegraph";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub lock: LockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store database file name, relative to the project directory.
    #[serde(default = "default_store_file")]
    pub file: String,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_store_file(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// How long to wait for the store lock before giving up, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl LockConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Machine-level overrides, from the user config directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Directory to keep store databases in, instead of the project dir.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

fn default_store_file() -> String {
    "casegraph.sqlite3".to_string()
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

/// Load the project config from `<root>/.casegraph/config.toml`.
///
/// A missing file yields the defaults; a present but unparsable file is an
/// error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
}

/// Load the user config from the platform config directory, if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read user config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse user config {}", path.display()))
}

/// Platform path of the user-level config file, when resolvable.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("casegraph").join("config.toml"))
}

/// Resolve the store database path for a project.
///
/// The user-level `store_dir` override wins when set; otherwise the store
/// lives inside the project directory.
#[must_use]
pub fn store_path(project_root: &Path, project: &ProjectConfig, user: &UserConfig) -> PathBuf {
    user.store_dir.as_ref().map_or_else(
        || project_root.join(PROJECT_DIR).join(&project.store.file),
        |dir| dir.join(&project.store.file),
    )
}

/// Path of the advisory lock file for a project's store.
#[must_use]
pub fn lock_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("store.lock")
}
