//! Unlock command implementation - clears a stale advisory lock

use anyhow::{Context, Result};
use tm_db::DatabaseLedger;

use crate::cli::{GlobalArgs, UnlockArgs};
use crate::commands::common::{close_database, load_project, open_database};

/// Execute the unlock command
pub(crate) async fn execute(_args: &UnlockArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = load_project(global)?;
    let db = open_database(&ctx, global)?;

    if !db.ledger_exists().await? {
        println!("No ledger found; nothing to unlock");
        return close_database(db);
    }

    match db
        .force_release_lock()
        .await
        .context("Failed to clear migration lock")?
    {
        Some(holder) => {
            log::warn!("Cleared migration lock held by {holder}");
            println!("Lock released (was held by {holder})");
        }
        None => println!("No lock held"),
    }
    close_database(db)
}
