//! SQLite store utilities.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` to allow concurrent readers while a writer commits
//! - `busy_timeout = 5s` to reduce transient lock failures under contention
//! - `foreign_keys = ON` to protect document ownership integrity
//!
//! The resolved endpoint columns on associations are exempt from foreign-key
//! enforcement at the schema level (see [`schema`]); dangling references are
//! tolerated data.

pub mod migrations;
pub mod query;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

use crate::config;

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the store database, apply runtime pragmas, and migrate
/// schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening/configuring/migrating the database fails.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open store database {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;

    Ok(conn)
}

/// Open the store for a project root, honoring project and user config.
///
/// Resolves `.casegraph/config.toml` (store file name, busy timeout) and
/// the optional user-level store-directory override, then opens the store
/// at the resolved path.
///
/// # Errors
///
/// Returns an error if config loading or the open itself fails.
pub fn open_project_store(project_root: &Path) -> Result<Connection> {
    let project = config::load_project_config(project_root).context("load project config")?;
    let user = config::load_user_config().context("load user config")?;

    let path = config::store_path(project_root, &project, &user);
    let conn = open_store(&path)?;
    conn.busy_timeout(Duration::from_millis(project.store.busy_timeout_ms))
        .context("apply configured busy timeout")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}
