//! tm-runner - Ledger-backed migration engine for Tidemark
//!
//! [`Migrator`] is the single entry point: it loads and validates a migration
//! set through `tm-core`, bootstraps the ledger through `tm-db`, and applies
//! every not-yet-ledgered migration number in sequence order.

pub mod error;
pub mod migrator;
pub mod state;

pub use error::{MigrationError, MigrationResult};
pub use migrator::{MigrationKey, Migrator, Plan, RunReport};
pub use state::RunState;
