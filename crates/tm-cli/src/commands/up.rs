//! Up command implementation - applies pending migrations

use anyhow::{Context, Result};
use tm_runner::{MigrationKey, Migrator};

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{close_database, load_project, open_database};

/// Execute the up command
pub(crate) async fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = load_project(global)?;
    let require_pairs = ctx.require_opposite_pairs(args.allow_unpaired);
    let db = open_database(&ctx, global)?;
    let source = ctx.source();

    {
        let mut migrator = Migrator::new(&db, &source, ctx.migrations_dir());

        if args.dry_run {
            let plan = migrator
                .plan(require_pairs)
                .await
                .context("Failed to plan migrations")?;
            if plan.pending.is_empty() {
                println!("Dry run - nothing to apply");
            } else {
                println!("Dry run - would apply:");
                print_keys(&plan.pending);
            }
        } else {
            let report = migrator
                .run_migrations(require_pairs)
                .await
                .context("Migration run failed")?;
            if report.applied.is_empty() {
                println!("Already up to date ({} skipped)", report.skipped.len());
            } else {
                println!("Applied:");
                print_keys(&report.applied);
                println!(
                    "\n{} applied, {} skipped",
                    report.applied.len(),
                    report.skipped.len()
                );
            }
        }
    }

    close_database(db)
}

fn print_keys(keys: &[MigrationKey]) {
    for (number, direction) in keys {
        println!("  {number} {direction}");
    }
}
