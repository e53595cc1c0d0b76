//! Ledger-backed execution engine.

use crate::error::{MigrationError, MigrationResult};
use crate::state::RunState;
use std::collections::HashSet;
use tm_core::{
    load_migrations, Direction, Migration, MigrationNumber, MigrationSet, MigrationSource,
};
use tm_db::{Database, LedgerEntry, LockAttempt};
use uuid::Uuid;

/// Identity of a migration record: number plus direction.
pub type MigrationKey = (MigrationNumber, Direction);

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Records executed and ledgered in this run, in order
    pub applied: Vec<MigrationKey>,
    /// Records skipped because their number was already in the ledger
    pub skipped: Vec<MigrationKey>,
}

/// What a run would do against the current ledger, without doing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Records that would be executed, in order
    pub pending: Vec<MigrationKey>,
    /// Records that would be skipped
    pub skipped: Vec<MigrationKey>,
}

/// Applies a directory of migrations to a database exactly once per number.
///
/// One migrator drives one database from one process. Concurrent migrators
/// against the same ledger are kept apart by the ledger's advisory lock.
pub struct Migrator<'a> {
    db: &'a dyn Database,
    source: &'a dyn MigrationSource,
    migrations_dir: String,
    migrations: MigrationSet,
    state: RunState,
}

impl<'a> Migrator<'a> {
    /// Create a migrator reading `migrations_dir` from `source` and applying to `db`.
    pub fn new(
        db: &'a dyn Database,
        source: &'a dyn MigrationSource,
        migrations_dir: impl Into<String>,
    ) -> Self {
        Self {
            db,
            source,
            migrations_dir: migrations_dir.into(),
            migrations: MigrationSet::default(),
            state: RunState::NotBootstrapped,
        }
    }

    /// Current position in the run state machine
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Records loaded by the last run, with their `applied` flags
    pub fn migrations(&self) -> &[Migration] {
        self.migrations.as_slice()
    }

    /// Create the ledger tables if they do not exist yet.
    pub async fn bootstrap(&mut self) -> MigrationResult<()> {
        self.db
            .bootstrap_ledger()
            .await
            .map_err(|cause| MigrationError::BootstrapFailed { cause })?;
        self.state = RunState::Bootstrapped;
        log::debug!("Ledger bootstrapped on {}", self.db.db_type());
        Ok(())
    }

    /// Load, validate and apply every migration whose number is not yet ledgered.
    ///
    /// With `require_opposite_pairs`, every number must have both an up and a
    /// down file. Validation happens before anything touches the database.
    /// The first failure aborts the run.
    pub async fn run_migrations(
        &mut self,
        require_opposite_pairs: bool,
    ) -> MigrationResult<RunReport> {
        self.state = RunState::NotBootstrapped;
        self.migrations =
            load_migrations(self.source, &self.migrations_dir, require_opposite_pairs)?;

        self.bootstrap().await?;

        if self.migrations.is_empty() {
            return Err(MigrationError::NoMigrationsFound {
                dir: self.migrations_dir.clone(),
            });
        }

        let holder = Uuid::new_v4().to_string();
        if let LockAttempt::HeldBy(owner) = self.db.try_acquire_lock(&holder).await? {
            return Err(MigrationError::LockHeld { holder: owner });
        }

        let result = self.apply_all().await;

        if let Err(e) = self.db.release_lock(&holder).await {
            if result.is_ok() {
                return Err(e.into());
            }
            log::warn!("Failed to release migration lock {holder}: {e}");
        }

        let report = result?;
        self.state = RunState::Complete;
        log::info!(
            "Migrations complete: {} applied, {} skipped",
            report.applied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn apply_all(&mut self) -> MigrationResult<RunReport> {
        let db = self.db;
        let mut report = RunReport::default();

        for index in 0..self.migrations.len() {
            self.state = RunState::Applying(index);
            let migration = &mut self.migrations.as_mut_slice()[index];

            match apply_one(db, migration).await {
                Ok(true) => {
                    migration.applied = true;
                    report.applied.push(migration.key());
                }
                Ok(false) => report.skipped.push(migration.key()),
                Err(e) => {
                    self.state = RunState::Failed(index);
                    return Err(e);
                }
            }
        }
        Ok(report)
    }

    /// Report which records a run would apply or skip right now.
    ///
    /// Loads and validates like a run, reads the ledger if it exists, and
    /// never writes to the database.
    pub async fn plan(&self, require_opposite_pairs: bool) -> MigrationResult<Plan> {
        let set = load_migrations(self.source, &self.migrations_dir, require_opposite_pairs)?;
        let ledger_ready = self.db.ledger_exists().await?;

        let mut plan = Plan::default();
        let mut planned: HashSet<MigrationNumber> = HashSet::new();
        for m in &set {
            let ledgered = ledger_ready
                && self
                    .db
                    .ledger_contains(i32::from(m.number))
                    .await
                    .map_err(|cause| MigrationError::LedgerReadFailed {
                        number: m.number,
                        cause,
                    })?;

            // Applying one direction ledgers the number, so the other is skipped.
            if ledgered || !planned.insert(m.number) {
                plan.skipped.push(m.key());
            } else {
                plan.pending.push(m.key());
            }
        }
        Ok(plan)
    }
}

/// Apply a single record. Returns `false` when its number is already ledgered.
async fn apply_one(db: &dyn Database, migration: &Migration) -> MigrationResult<bool> {
    let number = migration.number;

    let ledgered = db
        .ledger_contains(i32::from(number))
        .await
        .map_err(|cause| MigrationError::LedgerReadFailed { number, cause })?;
    if ledgered {
        log::debug!("Skipping {} (already in ledger)", migration.file_name());
        return Ok(false);
    }

    log::debug!("Applying {}", migration.file_name());
    db.execute_batch(&migration.body)
        .await
        .map_err(|cause| MigrationError::ApplyFailed { number, cause })?;

    db.record_ledger_entry(&LedgerEntry::from(migration))
        .await
        .map_err(|cause| MigrationError::LedgerWriteFailed { number, cause })?;

    Ok(true)
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
