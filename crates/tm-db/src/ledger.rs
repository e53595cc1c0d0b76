//! Ledger table definitions and row types.

use tm_core::Migration;

/// Bootstrap DDL for the ledger and lock tables. Safe to run on every invocation.
pub const LEDGER_DDL: &str = include_str!("ledger.sql");

/// Name of the ledger table
pub const LEDGER_TABLE: &str = "migrations";

/// Name of the advisory lock table
pub const LOCK_TABLE: &str = "migrations_lock";

/// One row of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Migration number
    pub num: i32,
    /// Migration title
    pub title: String,
    /// Direction flag: `true` for an up migration
    pub applied: bool,
}

impl LedgerEntry {
    pub fn new(num: i32, title: impl Into<String>, applied: bool) -> Self {
        Self {
            num,
            title: title.into(),
            applied,
        }
    }
}

impl From<&Migration> for LedgerEntry {
    fn from(m: &Migration) -> Self {
        Self {
            num: i32::from(m.number),
            title: m.title.clone(),
            applied: m.direction.is_up(),
        }
    }
}

/// Outcome of trying to take the advisory lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAttempt {
    /// The lock row now belongs to the caller
    Acquired,
    /// Another holder already owns the lock
    HeldBy(String),
}
