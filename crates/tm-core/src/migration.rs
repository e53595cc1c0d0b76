//! Migration record types.

use serde::Serialize;
use std::fmt;

/// Strongly-typed migration number in the range `1..=999`.
///
/// Displays zero-padded to three digits, matching the filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MigrationNumber(u16);

impl MigrationNumber {
    /// Smallest valid migration number.
    pub const MIN: u16 = 1;
    /// Largest valid migration number.
    pub const MAX: u16 = 999;

    /// Try to create a migration number, returning `None` outside `1..=999`.
    pub fn try_new(value: u32) -> Option<Self> {
        u16::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
    }

    /// Return the raw numeric value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MigrationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl From<MigrationNumber> for i32 {
    fn from(n: MigrationNumber) -> Self {
        i32::from(n.0)
    }
}

/// Direction of a migration artifact.
///
/// `Up` orders before `Down`, which is the tie-break the sequencer relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Forward change (`.up.sql`)
    Up,
    /// Reverse change (`.down.sql`)
    Down,
}

impl Direction {
    /// Filename keyword for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Whether this is the forward direction.
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }

    /// The other direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One migration artifact, parsed and loaded.
///
/// Records are rebuilt from the artifact source on every run. The `applied`
/// flag only reflects the current run; the ledger is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    /// Numeric identity shared by an up/down pair
    pub number: MigrationNumber,

    /// Title segment of the filename
    pub title: String,

    /// Up or down
    pub direction: Direction,

    /// Raw SQL executed verbatim
    #[serde(skip_serializing)]
    pub body: String,

    /// Set once the body has been executed and ledgered in this run
    pub applied: bool,
}

impl Migration {
    /// Create an unapplied migration record.
    pub fn new(
        number: MigrationNumber,
        title: impl Into<String>,
        direction: Direction,
        body: impl Into<String>,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            direction,
            body: body.into(),
            applied: false,
        }
    }

    /// Identity of the record within a set.
    pub fn key(&self) -> (MigrationNumber, Direction) {
        (self.number, self.direction)
    }

    /// Canonical artifact filename, e.g. `001_init.up.sql`.
    pub fn file_name(&self) -> String {
        format!("{}_{}.{}.sql", self.number, self.title, self.direction)
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
