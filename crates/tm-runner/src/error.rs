//! Error types for tm-runner

use thiserror::Error;
use tm_core::{CoreError, MigrationNumber};
use tm_db::DbError;

/// Errors that abort a migration run.
///
/// Load and validation failures (`Load`) are raised before any statement
/// reaches the database. Apply-phase failures may leave earlier migrations
/// committed; re-running resumes after the last ledgered number.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Source, naming, numbering or pairing failure
    #[error(transparent)]
    Load(#[from] CoreError),

    /// R001: The validated set is empty
    #[error("[R001] No migrations found in '{dir}'")]
    NoMigrationsFound { dir: String },

    /// R002: The ledger bootstrap DDL failed
    #[error("[R002] Failed to bootstrap ledger: {cause}")]
    BootstrapFailed { cause: DbError },

    /// R003: A migration body failed to execute
    #[error("[R003] Migration {number} failed to apply: {cause}")]
    ApplyFailed {
        number: MigrationNumber,
        cause: DbError,
    },

    /// R004: The body ran but its ledger row could not be written
    #[error("[R004] Migration {number} was applied but could not be recorded in the ledger: {cause}")]
    LedgerWriteFailed {
        number: MigrationNumber,
        cause: DbError,
    },

    /// R005: Another migrator holds the advisory lock
    #[error("[R005] Migration lock is held by '{holder}' (run `tm unlock` if it is stale)")]
    LockHeld { holder: String },

    /// R006: Connection-level failure outside a specific migration
    #[error("[R006] Database connection error: {0}")]
    Connection(#[from] DbError),

    /// R007: The ledger lookup for a migration failed
    #[error("[R007] Failed to read ledger for migration {number}: {cause}")]
    LedgerReadFailed {
        number: MigrationNumber,
        cause: DbError,
    },
}

/// Result type alias for MigrationError
pub type MigrationResult<T> = Result<T, MigrationError>;
