//! Error types for tm-core

use crate::migration::{Direction, MigrationNumber};
use thiserror::Error;

/// Errors raised while loading, validating or configuring migrations.
///
/// Every variant is fatal to the current run. None of them is raised after a
/// statement has touched the target database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// C001: Migration directory could not be listed or a file could not be read
    #[error("[C001] Migration source unavailable at '{path}': {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// C002: Filename is not `NNN_title.up.sql` / `NNN_title.down.sql`
    #[error("[C002] Migration name '{name}' is not valid (expected NNN_title.up.sql or NNN_title.down.sql)")]
    InvalidMigrationName { name: String },

    /// C003: Numeric prefix outside 1..=999
    #[error("[C003] Migration number {number} in '{name}' is not valid (expected 001-999)")]
    InvalidMigrationNumber { name: String, number: u32 },

    /// C004: Two files with the same number and direction
    #[error("[C004] Migration {number} has more than one {direction} file")]
    DuplicateDirection {
        number: MigrationNumber,
        direction: Direction,
    },

    /// C005: More than an up/down pair shares a number
    #[error("[C005] Migration {number} is declared by {count} files (at most 2 allowed)")]
    DuplicateNumber { number: MigrationNumber, count: usize },

    /// C006: Up without down (or down without up) while pairing is required
    #[error("[C006] Migration {number} has no opposite migration")]
    MissingOppositeMigration { number: MigrationNumber },

    /// C007: Configuration file not found
    #[error("[C007] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C008: Configuration file could not be parsed
    #[error("[C008] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C009: Invalid configuration value
    #[error("[C009] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
