use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

/// Which uniqueness constraint a concurrent writer tripped. The conflict
/// handler dispatches on this instead of raw SQLite error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Fingerprint,
    DedupKey,
    Other,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Fingerprint => write!(f, "fingerprint"),
            ConstraintKind::DedupKey => write!(f, "dedupKey"),
            ConstraintKind::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    Constraint(ConstraintKind),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store query failed: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ffi_err, ref message) = e {
            if ffi_err.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message.as_deref().unwrap_or("");
                let kind = if detail.contains("submissions.fingerprint") {
                    ConstraintKind::Fingerprint
                } else if detail.contains("course_ledger.student_key")
                    || detail.contains("course_ledger.dedup_key")
                {
                    ConstraintKind::DedupKey
                } else {
                    ConstraintKind::Other
                };
                return StoreError::Constraint(kind);
            }
        }
        StoreError::Sqlite(e)
    }
}

/// Process-wide store handle. The connection is opened lazily on first use,
/// reused while healthy, and dropped after an infrastructure failure so the
/// next request reconnects. The store itself is the concurrency arbiter;
/// there is no other cross-request state.
pub struct Store {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the shared connection, opening it first if needed.
    /// An open failure maps to `Unavailable`; an infrastructure-level query
    /// failure resets the cached handle. Constraint violations keep it.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().expect("store mutex poisoned");
        if guard.is_none() {
            let conn =
                open_db(&self.path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
            *guard = Some(conn);
        }
        let conn = guard.as_ref().expect("connection just initialized");
        let result = f(conn);
        if matches!(
            result,
            Err(StoreError::Sqlite(_)) | Err(StoreError::Unavailable(_))
        ) {
            *guard = None;
        }
        result
    }
}

pub fn open_db(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    // Concurrent writers race on the fingerprint constraint; let the loser
    // wait for the winner's commit instead of failing with SQLITE_BUSY.
    conn.busy_timeout(Duration::from_secs(5))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS submissions(
            id TEXT PRIMARY KEY,
            student_name TEXT NOT NULL,
            country TEXT NOT NULL,
            scale_legend TEXT NOT NULL,
            fingerprint TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    ensure_submissions_university_columns(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_ledger(
            id TEXT PRIMARY KEY,
            student_key TEXT NOT NULL,
            dedup_key TEXT NOT NULL,
            title TEXT NOT NULL,
            course_code TEXT NOT NULL,
            unit INTEGER NOT NULL,
            score INTEGER NOT NULL,
            submission_id TEXT NOT NULL,
            title_key TEXT NOT NULL,
            code_key TEXT NOT NULL,
            UNIQUE(student_key, dedup_key),
            FOREIGN KEY(submission_id) REFERENCES submissions(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_course_ledger_student ON course_ledger(student_key)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_course_ledger_submission ON course_ledger(submission_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_aliases(
            alias_key TEXT PRIMARY KEY,
            canonical_key TEXT NOT NULL,
            canonical_code TEXT NOT NULL,
            canonical_title TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

// Databases created before institution branding shipped lack these columns.
fn ensure_submissions_university_columns(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "submissions", "university_name")? {
        conn.execute("ALTER TABLE submissions ADD COLUMN university_name TEXT", [])?;
    }
    if !table_has_column(conn, "submissions", "university_logo_url")? {
        conn.execute(
            "ALTER TABLE submissions ADD COLUMN university_logo_url TEXT",
            [],
        )?;
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
