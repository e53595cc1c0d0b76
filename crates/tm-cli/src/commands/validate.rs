//! Validate command implementation - checks migration files offline

use anyhow::{Context, Result};
use tm_core::integrity;
use tm_core::parse_migrations;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::load_project;

/// Execute the validate command
///
/// Reports every set-level violation at once instead of stopping at the first.
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = load_project(global)?;
    let source = ctx.source();

    let migrations = parse_migrations(&source, ctx.migrations_dir())
        .context("Failed to read migrations")?;
    let require_pairs = ctx.require_opposite_pairs(args.allow_unpaired);
    let violations = integrity::check(&migrations, require_pairs);

    if violations.is_empty() {
        println!(
            "{} migration file(s) in '{}' are valid",
            migrations.len(),
            ctx.migrations_dir()
        );
        return Ok(());
    }

    for violation in &violations {
        eprintln!("  {violation}");
    }
    anyhow::bail!(
        "{} problem(s) found in '{}'",
        violations.len(),
        ctx.migrations_dir()
    )
}
