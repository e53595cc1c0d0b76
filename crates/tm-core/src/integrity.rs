//! Set-level integrity checks over parsed migrations.
//!
//! Pairing is a property of the whole set, so [`check`] runs once over an
//! immutable snapshot of every parsed record and reports every violation it
//! finds. Nothing is mutated while scanning.

use crate::error::CoreError;
use crate::migration::{Direction, Migration, MigrationNumber};
use std::collections::BTreeMap;
use std::fmt;

/// A single broken invariant in a migration set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two or more records share a number and a direction
    DuplicateDirection {
        number: MigrationNumber,
        direction: Direction,
    },
    /// More than two records share a number
    DuplicateNumber {
        number: MigrationNumber,
        count: usize,
    },
    /// Only one direction exists for a number while pairing is required
    MissingOpposite {
        number: MigrationNumber,
        missing: Direction,
    },
}

impl Violation {
    /// Migration number the violation refers to.
    pub fn number(&self) -> MigrationNumber {
        match self {
            Violation::DuplicateDirection { number, .. }
            | Violation::DuplicateNumber { number, .. }
            | Violation::MissingOpposite { number, .. } => *number,
        }
    }
}

impl From<Violation> for CoreError {
    fn from(v: Violation) -> Self {
        match v {
            Violation::DuplicateDirection { number, direction } => {
                CoreError::DuplicateDirection { number, direction }
            }
            Violation::DuplicateNumber { number, count } => {
                CoreError::DuplicateNumber { number, count }
            }
            Violation::MissingOpposite { number, .. } => {
                CoreError::MissingOppositeMigration { number }
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingOpposite { number, missing } => {
                write!(f, "migration {number} is missing its {missing} file")
            }
            other => write!(f, "{}", CoreError::from(other.clone())),
        }
    }
}

/// Per-number tally of records by direction.
#[derive(Default)]
struct Tally {
    up: usize,
    down: usize,
}

impl Tally {
    fn total(&self) -> usize {
        self.up + self.down
    }
}

/// Check the set-level invariants of `migrations`.
///
/// Violations are returned grouped by ascending number; within a number,
/// duplicate directions come first (up, then down), then an over-count, then a
/// missing opposite. An empty result means the set is valid.
pub fn check(migrations: &[Migration], require_opposite: bool) -> Vec<Violation> {
    let mut tallies: BTreeMap<MigrationNumber, Tally> = BTreeMap::new();
    for m in migrations {
        let tally = tallies.entry(m.number).or_default();
        match m.direction {
            Direction::Up => tally.up += 1,
            Direction::Down => tally.down += 1,
        }
    }

    let mut violations = Vec::new();
    for (&number, tally) in &tallies {
        for (direction, count) in [(Direction::Up, tally.up), (Direction::Down, tally.down)] {
            if count > 1 {
                violations.push(Violation::DuplicateDirection { number, direction });
            }
        }

        if tally.total() > 2 {
            violations.push(Violation::DuplicateNumber {
                number,
                count: tally.total(),
            });
        }

        if require_opposite {
            if tally.up == 0 {
                violations.push(Violation::MissingOpposite {
                    number,
                    missing: Direction::Up,
                });
            } else if tally.down == 0 {
                violations.push(Violation::MissingOpposite {
                    number,
                    missing: Direction::Down,
                });
            }
        }
    }
    violations
}

#[cfg(test)]
#[path = "integrity_test.rs"]
mod tests;
