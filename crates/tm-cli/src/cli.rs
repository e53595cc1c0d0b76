//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Tidemark - apply versioned SQL migrations exactly once
#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target from the config file (falls back to TIDEMARK_TARGET)
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// Override the database path (`:memory:` allowed)
    #[arg(long, global = true, env = "TIDEMARK_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the ledger table in the target database
    Init(InitArgs),

    /// Apply every migration not yet recorded in the ledger
    Up(UpArgs),

    /// Show each migration and whether it has been applied
    Status(StatusArgs),

    /// Check migration files without touching a database
    Validate(ValidateArgs),

    /// Clear a stale migration lock left by a crashed run
    Unlock(UnlockArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Allow migrations without an opposite (up/down) file
    #[arg(long)]
    pub allow_unpaired: bool,

    /// Print what would be applied without executing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,

    /// Allow migrations without an opposite (up/down) file
    #[arg(long)]
    pub allow_unpaired: bool,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Allow migrations without an opposite (up/down) file
    #[arg(long)]
    pub allow_unpaired: bool,
}

/// Arguments for the unlock command
#[derive(Args, Debug)]
pub struct UnlockArgs {}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
