//! Migration filename parsing and validation.
//!
//! Artifact names must be exactly `NNN_title.up.sql` or `NNN_title.down.sql`
//! where `NNN` is three ASCII digits (001-999) and `title` is
//! `[A-Za-z0-9_]+`. Anything else is rejected before any SQL is read.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Direction, MigrationNumber};
use regex::Regex;

/// Filename grammar. `[0-9]` rather than `\d` so that non-ASCII digits are rejected.
const MIGRATION_NAME_PATTERN: &str = r"^([0-9]{3})_([A-Za-z0-9_]+)\.(up|down)\.sql$";

/// Identity fields extracted from a valid artifact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationName {
    pub number: MigrationNumber,
    pub title: String,
    pub direction: Direction,
}

/// Parses artifact filenames into [`MigrationName`]s.
///
/// Holds its own compiled matcher; build one per load and reuse it for every
/// file in the directory.
#[derive(Debug, Clone)]
pub struct NameParser {
    pattern: Regex,
}

impl Default for NameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NameParser {
    /// Compile the filename grammar.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(MIGRATION_NAME_PATTERN).expect("valid regex literal"),
        }
    }

    /// Whether `name` is in the artifact filename language.
    pub fn is_valid(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Parse `name` into its number, title and direction.
    ///
    /// Fails with [`CoreError::InvalidMigrationName`] when the name does not
    /// match the grammar, and with [`CoreError::InvalidMigrationNumber`] when
    /// the numeric prefix is `000`.
    pub fn parse(&self, name: &str) -> CoreResult<MigrationName> {
        let invalid = || CoreError::InvalidMigrationName {
            name: name.to_string(),
        };

        let caps = self.pattern.captures(name).ok_or_else(invalid)?;
        let (digits, title, keyword) = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(d), Some(t), Some(k)) => (d.as_str(), t.as_str(), k.as_str()),
            _ => return Err(invalid()),
        };

        let raw: u32 = digits.parse().map_err(|_| invalid())?;
        let number =
            MigrationNumber::try_new(raw).ok_or_else(|| CoreError::InvalidMigrationNumber {
                name: name.to_string(),
                number: raw,
            })?;

        let direction = match keyword {
            "up" => Direction::Up,
            "down" => Direction::Down,
            _ => return Err(invalid()),
        };

        Ok(MigrationName {
            number,
            title: title.to_string(),
            direction,
        })
    }
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
