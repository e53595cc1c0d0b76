//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tm_core::{Config, DirSource};
use tm_db::{ConnectionParams, DuckDbBackend};

use crate::cli::GlobalArgs;

/// Loaded project: its root directory and configuration.
pub(crate) struct ProjectContext {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl ProjectContext {
    /// Source rooted at the project directory; read `migrations_dir` from it.
    pub(crate) fn source(&self) -> DirSource {
        DirSource::new(&self.root)
    }

    /// Migrations directory as configured, relative to the project root
    pub(crate) fn migrations_dir(&self) -> &str {
        &self.config.migrations_dir
    }

    /// Whether every number needs both an up and a down file for this invocation
    pub(crate) fn require_opposite_pairs(&self, allow_unpaired: bool) -> bool {
        self.config.require_opposite_pairs && !allow_unpaired
    }
}

/// Install the `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// default is `info`.
pub(crate) fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Load the project configuration from `--config` or the project directory.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<ProjectContext> {
    let root = PathBuf::from(&global.project_dir);
    if !root.is_dir() {
        anyhow::bail!("Project directory not found: {}", root.display());
    }

    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project configuration")?;
    log::debug!(
        "Migrations directory: {}",
        config.migrations_path_absolute(&root).display()
    );

    Ok(ProjectContext { root, config })
}

/// Resolve which database to connect to.
///
/// Priority: `--database` / `TIDEMARK_DATABASE` > `--target` / `TIDEMARK_TARGET` > base config.
/// Relative file paths resolve against the project directory.
pub(crate) fn resolve_connection(
    ctx: &ProjectContext,
    global: &GlobalArgs,
) -> Result<ConnectionParams> {
    let path = match &global.database {
        Some(path) => path.clone(),
        None => {
            let target = Config::resolve_target(global.target.as_deref());
            ctx.config
                .get_database_config(target.as_deref())
                .context("Failed to get database configuration")?
                .path
        }
    };
    Ok(ConnectionParams::from_path_str(&path).resolve_against(&ctx.root))
}

/// Open (and ping) the configured database.
pub(crate) fn open_database(ctx: &ProjectContext, global: &GlobalArgs) -> Result<DuckDbBackend> {
    let params = resolve_connection(ctx, global)?;
    log::debug!("Connecting to {params}");
    DuckDbBackend::open(&params)
        .with_context(|| format!("Failed to connect to database: {params}"))
}

/// Close the database, reporting close errors.
pub(crate) fn close_database(db: DuckDbBackend) -> Result<()> {
    db.close().context("Failed to close database")
}
