//! Init command implementation - bootstraps the ledger table

use anyhow::{Context, Result};
use tm_runner::Migrator;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common::{close_database, load_project, open_database};

/// Execute the init command
pub(crate) async fn execute(_args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = load_project(global)?;
    let db = open_database(&ctx, global)?;
    let source = ctx.source();

    Migrator::new(&db, &source, ctx.migrations_dir())
        .bootstrap()
        .await
        .context("Failed to initialize ledger")?;

    println!("Ledger ready");
    close_database(db)
}
