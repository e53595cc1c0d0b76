use super::*;
use async_trait::async_trait;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;
use tm_core::{CoreError, DirSource};
use tm_db::{DatabaseCore, DatabaseLedger, DbError, DbResult};

/// In-memory stand-in that records executed SQL and can fail on demand.
#[derive(Default)]
struct FakeDb {
    executed: Mutex<Vec<String>>,
    ledger: Mutex<Vec<LedgerEntry>>,
    lock: Mutex<Option<String>>,
    bootstrapped: Mutex<bool>,
    fail_bootstrap: bool,
    fail_sql_containing: Option<&'static str>,
    fail_ledger_write_for: Option<i32>,
}

impl FakeDb {
    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn ledger(&self) -> Vec<LedgerEntry> {
        self.ledger.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatabaseCore for FakeDb {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        if self.fail_sql_containing.is_some_and(|needle| sql.contains(needle)) {
            return Err(DbError::ExecutionError(format!("syntax error: {sql}")));
        }
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn relation_exists(&self, _name: &str) -> DbResult<bool> {
        Ok(false)
    }

    async fn column_exists(&self, _table: &str, _column: &str) -> DbResult<bool> {
        Ok(false)
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl DatabaseLedger for FakeDb {
    async fn bootstrap_ledger(&self) -> DbResult<()> {
        if self.fail_bootstrap {
            return Err(DbError::ExecutionError("permission denied".to_string()));
        }
        *self.bootstrapped.lock().unwrap() = true;
        Ok(())
    }

    async fn ledger_exists(&self) -> DbResult<bool> {
        Ok(*self.bootstrapped.lock().unwrap())
    }

    async fn ledger_contains(&self, num: i32) -> DbResult<bool> {
        Ok(self.ledger.lock().unwrap().iter().any(|e| e.num == num))
    }

    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> DbResult<()> {
        if self.fail_ledger_write_for == Some(entry.num) {
            return Err(DbError::ExecutionError("disk full".to_string()));
        }
        self.ledger.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn ledger_entries(&self) -> DbResult<Vec<LedgerEntry>> {
        Ok(self.ledger())
    }

    async fn try_acquire_lock(&self, holder: &str) -> DbResult<LockAttempt> {
        let mut lock = self.lock.lock().unwrap();
        match lock.as_ref() {
            Some(current) => Ok(LockAttempt::HeldBy(current.clone())),
            None => {
                *lock = Some(holder.to_string());
                Ok(LockAttempt::Acquired)
            }
        }
    }

    async fn release_lock(&self, holder: &str) -> DbResult<()> {
        let mut lock = self.lock.lock().unwrap();
        if lock.as_deref() == Some(holder) {
            *lock = None;
        }
        Ok(())
    }

    async fn force_release_lock(&self) -> DbResult<Option<String>> {
        Ok(self.lock.lock().unwrap().take())
    }
}

fn paired_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, body) in [
        ("001_init.up.sql", "CREATE TABLE t(id int)"),
        ("001_init.down.sql", "DROP TABLE t"),
        ("002_add_col.up.sql", "ALTER TABLE t ADD COLUMN x int"),
        ("002_add_col.down.sql", "ALTER TABLE t DROP COLUMN x"),
    ] {
        fs::write(temp.path().join(name), body).unwrap();
    }
    temp
}

fn key(n: u32, direction: Direction) -> MigrationKey {
    (MigrationNumber::try_new(n).unwrap(), direction)
}

#[tokio::test]
async fn test_applies_up_then_skips_down_of_same_number() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();
    let mut migrator = Migrator::new(&db, &source, "");

    let report = migrator.run_migrations(true).await.unwrap();

    assert_eq!(
        report.applied,
        vec![key(1, Direction::Up), key(2, Direction::Up)]
    );
    assert_eq!(
        report.skipped,
        vec![key(1, Direction::Down), key(2, Direction::Down)]
    );
    assert_eq!(
        db.executed(),
        vec!["CREATE TABLE t(id int)", "ALTER TABLE t ADD COLUMN x int"]
    );
    assert_eq!(
        db.ledger(),
        vec![
            LedgerEntry::new(1, "init", true),
            LedgerEntry::new(2, "add_col", true)
        ]
    );
    assert_eq!(migrator.state(), RunState::Complete);

    let flags: Vec<bool> = migrator.migrations().iter().map(|m| m.applied).collect();
    assert_eq!(flags, vec![true, false, true, false]);
}

#[tokio::test]
async fn test_second_run_applies_nothing() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();

    Migrator::new(&db, &source, "")
        .run_migrations(true)
        .await
        .unwrap();
    let report = Migrator::new(&db, &source, "")
        .run_migrations(true)
        .await
        .unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.skipped.len(), 4);
    assert_eq!(db.ledger().len(), 2);
    assert_eq!(db.executed().len(), 2);
}

#[tokio::test]
async fn test_validation_failure_touches_nothing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("001_init.up.sql"), "CREATE TABLE t(id int)").unwrap();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();
    let mut migrator = Migrator::new(&db, &source, "");

    let err = migrator.run_migrations(true).await.unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Load(CoreError::MissingOppositeMigration { .. })
    ));
    assert!(!*db.bootstrapped.lock().unwrap());
    assert!(db.executed().is_empty());
    assert_eq!(migrator.state(), RunState::NotBootstrapped);
    assert!(!migrator.state().is_terminal());
}

#[tokio::test]
async fn test_empty_set_is_an_error() {
    let temp = TempDir::new().unwrap();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();

    let err = Migrator::new(&db, &source, "")
        .run_migrations(true)
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::NoMigrationsFound { .. }));
}

#[tokio::test]
async fn test_bootstrap_failure() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb {
        fail_bootstrap: true,
        ..FakeDb::default()
    };

    let err = Migrator::new(&db, &source, "")
        .run_migrations(true)
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::BootstrapFailed { .. }));
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn test_apply_failure_stops_run_and_releases_lock() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb {
        fail_sql_containing: Some("ADD COLUMN"),
        ..FakeDb::default()
    };
    let mut migrator = Migrator::new(&db, &source, "");

    let err = migrator.run_migrations(true).await.unwrap_err();

    assert!(matches!(
        err,
        MigrationError::ApplyFailed { number, .. } if number.get() == 2
    ));
    assert_eq!(db.ledger(), vec![LedgerEntry::new(1, "init", true)]);
    assert_eq!(migrator.state(), RunState::Failed(2));
    assert!(migrator.state().is_terminal());
    assert!(db.lock.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_ledger_write_failure() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb {
        fail_ledger_write_for: Some(1),
        ..FakeDb::default()
    };

    let err = Migrator::new(&db, &source, "")
        .run_migrations(true)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::LedgerWriteFailed { number, .. } if number.get() == 1
    ));
    // The body ran even though the ledger row is missing
    assert_eq!(db.executed(), vec!["CREATE TABLE t(id int)"]);
    assert!(db.ledger().is_empty());
}

#[tokio::test]
async fn test_held_lock_blocks_run() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();
    *db.lock.lock().unwrap() = Some("other-run".to_string());

    let err = Migrator::new(&db, &source, "")
        .run_migrations(true)
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::LockHeld { holder } if holder == "other-run"));
    assert!(db.executed().is_empty());
    assert_eq!(db.lock.lock().unwrap().as_deref(), Some("other-run"));
}

#[tokio::test]
async fn test_plan_without_ledger() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();

    let plan = Migrator::new(&db, &source, "").plan(true).await.unwrap();
    assert_eq!(
        plan.pending,
        vec![key(1, Direction::Up), key(2, Direction::Up)]
    );
    assert_eq!(
        plan.skipped,
        vec![key(1, Direction::Down), key(2, Direction::Down)]
    );
    assert!(!*db.bootstrapped.lock().unwrap());
}

#[tokio::test]
async fn test_plan_respects_ledger() {
    let temp = paired_dir();
    let source = DirSource::new(temp.path());
    let db = FakeDb::default();
    *db.bootstrapped.lock().unwrap() = true;
    db.ledger
        .lock()
        .unwrap()
        .push(LedgerEntry::new(1, "init", true));

    let plan = Migrator::new(&db, &source, "").plan(true).await.unwrap();
    assert_eq!(plan.pending, vec![key(2, Direction::Up)]);
    assert_eq!(plan.skipped.len(), 3);
}
