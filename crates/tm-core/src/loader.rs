//! Migration loading pipeline.
//!
//! Source → name parser (per file) → integrity check (whole set) → sequencer.
//! Each phase finishes for the complete set before the next one starts, and
//! the first failure aborts the load.

use crate::error::{CoreError, CoreResult};
use crate::integrity;
use crate::migration::Migration;
use crate::naming::NameParser;
use crate::sequence::sequence;
use crate::source::{join_path, MigrationSource};

/// A validated, sequenced set of migrations ready to apply.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Number of records in the set
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the set has no records
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Records in application order
    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    /// Records in application order
    pub fn as_slice(&self) -> &[Migration] {
        &self.migrations
    }

    /// Mutable access for the engine to flag applied records.
    pub fn as_mut_slice(&mut self) -> &mut [Migration] {
        &mut self.migrations
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.iter()
    }
}

/// Parse every artifact directly inside `dir` without checking set invariants.
///
/// Entries are visited in name order so the first rejected file is the same on
/// every platform. Returns records in that same name order.
pub fn parse_migrations(source: &dyn MigrationSource, dir: &str) -> CoreResult<Vec<Migration>> {
    let parser = NameParser::new();
    let mut entries = source.read_entries(dir)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut migrations = Vec::with_capacity(entries.len());
    for (name, bytes) in entries {
        let parsed = parser.parse(&name)?;
        let body = String::from_utf8(bytes).map_err(|e| CoreError::SourceUnavailable {
            path: join_path(dir, &name),
            reason: format!("not valid UTF-8: {e}"),
        })?;
        migrations.push(Migration::new(
            parsed.number,
            parsed.title,
            parsed.direction,
            body,
        ));
    }
    Ok(migrations)
}

/// Load, validate and sequence the migrations in `dir`.
///
/// With `require_opposite` set, every number must have both an up and a down
/// file. Fails with the first violation found (lowest number first).
pub fn load_migrations(
    source: &dyn MigrationSource,
    dir: &str,
    require_opposite: bool,
) -> CoreResult<MigrationSet> {
    let migrations = parse_migrations(source, dir)?;
    log::debug!(
        "Parsed {} migration files from {}",
        migrations.len(),
        source.describe()
    );

    if let Some(violation) = integrity::check(&migrations, require_opposite)
        .into_iter()
        .next()
    {
        return Err(violation.into());
    }

    Ok(MigrationSet {
        migrations: sequence(migrations),
    })
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
