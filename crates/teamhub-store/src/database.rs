//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/teamhub/teamhub.db`
    /// - macOS:   `~/Library/Application Support/com.teamhub.teamhub/teamhub.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\teamhub\teamhub\data\teamhub.db`
    pub fn new() -> Result<Self> {
        let db_path = Self::default_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Location used by [`Database::new`].
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "teamhub", "teamhub").ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join("teamhub.db"))
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open a private in-memory database. Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// Drop every cached row. Used on sign-out.
    pub fn clear_all(&self) -> Result<()> {
        tracing::info!("clearing local cache");
        self.conn.execute_batch(
            "BEGIN;
             DELETE FROM messages;
             DELETE FROM channels;
             DELETE FROM bugs;
             DELETE FROM tasks;
             DELETE FROM epics;
             DELETE FROM sprints;
             DELETE FROM notifications;
             DELETE FROM invitations;
             DELETE FROM workspaces;
             DELETE FROM users;
             DELETE FROM accounts;
             DELETE FROM sync_state;
             COMMIT;",
        )?;
        Ok(())
    }
}
