//! tm-db - Database layer for Tidemark
//!
//! This crate provides the `DatabaseCore` and `DatabaseLedger` traits the
//! migration engine talks to, the embedded ledger DDL, and the DuckDB backend.

pub mod duckdb;
pub mod error;
pub mod ledger;
pub mod traits;

pub use crate::duckdb::{ConnectionParams, DuckDbBackend};
pub use error::{DbError, DbResult};
pub use ledger::{LedgerEntry, LockAttempt, LEDGER_DDL, LEDGER_TABLE, LOCK_TABLE};
pub use traits::{Database, DatabaseCore, DatabaseLedger};
