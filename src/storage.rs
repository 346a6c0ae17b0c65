//! Local persistence for projects and their workflow snapshots.
//!
//! Each project lives in its own `SQLite` file under the storage root:
//!
//! ```text
//! <root>/<uuid>.sqlite
//!   project    # the project record, one row
//!   snapshot   # append-only workflow snapshots, newest last
//! ```

mod project;
mod snapshot;

pub use snapshot::SnapshotRecord;

use std::{fs, io, path::PathBuf};

use rusqlite::{Connection, OpenFlags};
use uuid::Uuid;

use crate::snapshot::SnapshotError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("project already exists: {0}")]
    ProjectAlreadyExists(Uuid),

    #[error("no project matches '{0}'")]
    NoMatch(String),

    #[error("'{prefix}' matches {count} projects; use more characters")]
    Ambiguous { prefix: String, count: usize },

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE project (
        id         TEXT PRIMARY KEY,
        title      TEXT NOT NULL,
        created_at TEXT NOT NULL,
        ideation   TEXT NOT NULL,
        pending    TEXT
    );
    CREATE TABLE snapshot (
        seq      INTEGER PRIMARY KEY AUTOINCREMENT,
        saved_at TEXT NOT NULL,
        state    TEXT NOT NULL,
        digest   TEXT NOT NULL,
        body     TEXT NOT NULL
    );
";

/// Local `SQLite`-backed storage for projects.
#[derive(Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `projects/` under the Pathway home.
    pub fn default_root() -> Option<PathBuf> {
        crate::config::home().map(|h| h.join("projects"))
    }

    /// Creates the database for a new project.
    fn create_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.db_path(id);
        if path.exists() {
            return Err(StorageError::ProjectAlreadyExists(id));
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Opens an existing project's database.
    fn open_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.db_path(id);
        if !path.exists() {
            return Err(StorageError::ProjectNotFound(id));
        }
        Ok(Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }

    fn db_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.sqlite"))
    }
}
