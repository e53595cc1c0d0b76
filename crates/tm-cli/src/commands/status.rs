//! Status command implementation - lists migrations against the ledger

use anyhow::{Context, Result};
use serde::Serialize;
use tm_core::{load_migrations, Migration};
use tm_db::{DatabaseLedger, LedgerEntry};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{close_database, load_project, open_database};

/// Ledger state of one migration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MigrationStatus {
    /// This exact file was applied
    Applied,
    /// Its number was applied through the opposite file
    Skipped,
    /// Its number is not in the ledger
    Pending,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::Applied => write!(f, "applied"),
            MigrationStatus::Skipped => write!(f, "skipped"),
            MigrationStatus::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusRow {
    number: u16,
    title: String,
    direction: String,
    file: String,
    status: MigrationStatus,
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = load_project(global)?;
    let source = ctx.source();
    let set = load_migrations(
        &source,
        ctx.migrations_dir(),
        ctx.require_opposite_pairs(args.allow_unpaired),
    )
    .context("Failed to load migrations")?;

    let db = open_database(&ctx, global)?;
    let ledger = if db.ledger_exists().await? {
        db.ledger_entries().await.context("Failed to read ledger")?
    } else {
        Vec::new()
    };
    close_database(db)?;

    let rows: Vec<StatusRow> = set
        .iter()
        .map(|m| StatusRow {
            number: m.number.get(),
            title: m.title.clone(),
            direction: m.direction.to_string(),
            file: m.file_name(),
            status: status_of(m, &ledger),
        })
        .collect();

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        StatusOutput::Table => print_table(&rows),
    }
    Ok(())
}

/// Classify a migration against the ledger rows.
pub(crate) fn status_of(migration: &Migration, ledger: &[LedgerEntry]) -> MigrationStatus {
    let num = i32::from(migration.number);
    let mut rows = ledger.iter().filter(|e| e.num == num).peekable();
    if rows.peek().is_none() {
        return MigrationStatus::Pending;
    }
    if rows.any(|e| e.applied == migration.direction.is_up()) {
        MigrationStatus::Applied
    } else {
        MigrationStatus::Skipped
    }
}

fn print_table(rows: &[StatusRow]) {
    if rows.is_empty() {
        println!("No migrations found");
        return;
    }

    let file_width = rows.iter().map(|r| r.file.len()).max().unwrap_or(4).max(4);
    println!("{:<file_width$}  STATUS", "FILE");
    for row in rows {
        println!("{:<file_width$}  {}", row.file, row.status);
    }

    let pending = rows
        .iter()
        .filter(|r| r.status == MigrationStatus::Pending && r.direction == "up")
        .count();
    println!("\n{} migration(s), {} pending up", rows.len(), pending);
}
