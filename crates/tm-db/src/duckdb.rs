//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::ledger::{LedgerEntry, LockAttempt, LEDGER_DDL, LEDGER_TABLE};
use crate::traits::{DatabaseCore, DatabaseLedger};
use async_trait::async_trait;
use duckdb::{params, Connection};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Where a DuckDB connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionParams {
    /// Private in-memory database
    InMemory,
    /// Database file on disk (created if missing)
    File(PathBuf),
}

impl ConnectionParams {
    /// Interpret a configured path (`:memory:` selects an in-memory database)
    pub fn from_path_str(path: &str) -> Self {
        if path == ":memory:" {
            Self::InMemory
        } else {
            Self::File(PathBuf::from(path))
        }
    }

    /// Resolve a relative file path against `root`
    pub fn resolve_against(self, root: &Path) -> Self {
        match self {
            Self::File(p) if p.is_relative() => Self::File(root.join(p)),
            other => other,
        }
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str(":memory:"),
            Self::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// DuckDB database backend
///
/// A single shared connection; every call borrows it for one statement.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Open a connection and confirm it answers a query
    pub fn open(params: &ConnectionParams) -> DbResult<Self> {
        let conn = match params {
            ConnectionParams::InMemory => Connection::open_in_memory(),
            ConnectionParams::File(path) => Connection::open(path),
        }
        .map_err(|e| DbError::ConnectionError(format!("{e}: {params}")))?;

        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.ping_sync()?;
        log::debug!("Opened DuckDB connection to {params}");
        Ok(backend)
    }

    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        Self::open(&ConnectionParams::InMemory)
    }

    /// Close the connection, surfacing any error DuckDB reports
    pub fn close(self) -> DbResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        conn.close()
            .map_err(|(_, e)| DbError::CloseError(e.to_string()))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn ping_sync(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| DbError::ConnectionError(format!("ping failed: {e}")))?;
        Ok(())
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        // Handle schema-qualified names
        let (schema, table) = split_qualified(name);

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn column_exists_sync(&self, table: &str, column: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let (schema, table) = split_qualified(table);

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.columns WHERE table_schema = ? AND table_name = ? AND column_name = ?",
            params![schema, table, column],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn ledger_contains_sync(&self, num: i32) -> DbResult<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM migrations WHERE num = ?)",
            params![num],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn record_ledger_entry_sync(&self, entry: &LedgerEntry) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO migrations (num, title, applied) VALUES (?, ?, ?)",
            params![entry.num, entry.title, entry.applied],
        )?;
        Ok(())
    }

    fn ledger_entries_sync(&self) -> DbResult<Vec<LedgerEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT num, title, applied FROM migrations ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(LedgerEntry {
                num: row.get(0)?,
                title: row.get(1)?,
                applied: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    fn current_lock_holder(conn: &Connection) -> DbResult<Option<String>> {
        let mut stmt = conn.prepare("SELECT holder FROM migrations_lock WHERE id = 1")?;
        let mut rows = stmt.query([])?;
        let holder = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        Ok(holder)
    }

    fn try_acquire_lock_sync(&self, holder: &str) -> DbResult<LockAttempt> {
        let conn = self.lock()?;
        if let Some(current) = Self::current_lock_holder(&conn)? {
            return Ok(LockAttempt::HeldBy(current));
        }
        conn.execute(
            "INSERT INTO migrations_lock (id, holder) VALUES (1, ?)",
            params![holder],
        )?;
        Ok(LockAttempt::Acquired)
    }

    fn release_lock_sync(&self, holder: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM migrations_lock WHERE id = 1 AND holder = ?",
            params![holder],
        )?;
        Ok(())
    }

    fn force_release_lock_sync(&self) -> DbResult<Option<String>> {
        let conn = self.lock()?;
        let previous = Self::current_lock_holder(&conn)?;
        conn.execute("DELETE FROM migrations_lock", [])?;
        Ok(previous)
    }
}

/// Split `schema.table` into its parts, defaulting the schema to `main`.
fn split_qualified(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    }
}

#[async_trait]
impl DatabaseCore for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        self.column_exists_sync(table, column)
    }

    async fn ping(&self) -> DbResult<()> {
        self.ping_sync()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[async_trait]
impl DatabaseLedger for DuckDbBackend {
    async fn bootstrap_ledger(&self) -> DbResult<()> {
        self.execute_batch_sync(LEDGER_DDL)
    }

    async fn ledger_exists(&self) -> DbResult<bool> {
        self.relation_exists_sync(LEDGER_TABLE)
    }

    async fn ledger_contains(&self, num: i32) -> DbResult<bool> {
        self.ledger_contains_sync(num)
    }

    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> DbResult<()> {
        self.record_ledger_entry_sync(entry)
    }

    async fn ledger_entries(&self) -> DbResult<Vec<LedgerEntry>> {
        self.ledger_entries_sync()
    }

    async fn try_acquire_lock(&self, holder: &str) -> DbResult<LockAttempt> {
        self.try_acquire_lock_sync(holder)
    }

    async fn release_lock(&self, holder: &str) -> DbResult<()> {
        self.release_lock_sync(holder)
    }

    async fn force_release_lock(&self) -> DbResult<Option<String>> {
        self.force_release_lock_sync()
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
