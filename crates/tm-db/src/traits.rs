//! Database trait definitions

use crate::error::DbResult;
use crate::ledger::{LedgerEntry, LockAttempt};
use async_trait::async_trait;

/// Statement execution and introspection.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Execute one or more SQL statements verbatim
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Check if a column exists on a table
    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool>;

    /// Round-trip a trivial query to confirm the connection is alive
    async fn ping(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Ledger bookkeeping for applied migrations.
#[async_trait]
pub trait DatabaseLedger: Send + Sync {
    /// Create the ledger and lock tables if absent
    async fn bootstrap_ledger(&self) -> DbResult<()>;

    /// Whether the ledger table exists yet
    async fn ledger_exists(&self) -> DbResult<bool>;

    /// Whether any ledger row has the given migration number
    async fn ledger_contains(&self, num: i32) -> DbResult<bool>;

    /// Append one ledger row
    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> DbResult<()>;

    /// All ledger rows in insertion order
    async fn ledger_entries(&self) -> DbResult<Vec<LedgerEntry>>;

    /// Take the advisory lock for `holder` unless someone else holds it
    async fn try_acquire_lock(&self, holder: &str) -> DbResult<LockAttempt>;

    /// Release the advisory lock if `holder` owns it
    async fn release_lock(&self, holder: &str) -> DbResult<()>;

    /// Clear the advisory lock regardless of owner, returning the previous holder
    async fn force_release_lock(&self) -> DbResult<Option<String>>;
}

/// Everything the migration engine needs from a database.
pub trait Database: DatabaseCore + DatabaseLedger {}

impl<T: DatabaseCore + DatabaseLedger> Database for T {}
