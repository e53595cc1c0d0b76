//! tm-core - Core library for Tidemark
//!
//! This crate turns a directory of `NNN_title.(up|down).sql` artifacts into a
//! validated, deterministically ordered [`MigrationSet`]. It owns the migration
//! record, the filename parser, the set-level integrity checker, the sequencer,
//! the content providers artifacts are read from, and project configuration.

pub mod config;
pub mod error;
pub mod integrity;
pub mod loader;
pub mod migration;
pub mod naming;
pub mod sequence;
pub mod source;

pub use config::{Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};
pub use integrity::Violation;
pub use loader::{load_migrations, parse_migrations, MigrationSet};
pub use migration::{Direction, Migration, MigrationNumber};
pub use naming::{MigrationName, NameParser};
pub use source::{DirSource, EmbeddedSource, MigrationSource, SourceEntry};
