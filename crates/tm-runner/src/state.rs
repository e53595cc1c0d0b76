//! Run state machine.

use std::fmt;

/// Where a [`Migrator`](crate::Migrator) is within a run.
///
/// `NotBootstrapped → Bootstrapped → Applying(0) → … → Applying(n-1) → Complete`,
/// with `Failed` reachable from any `Applying` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotBootstrapped,
    Bootstrapped,
    /// Working on the record at this index of the sequenced set
    Applying(usize),
    Complete,
    /// Stopped on the record at this index
    Failed(usize),
}

impl RunState {
    /// Whether the run reached a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotBootstrapped => write!(f, "not bootstrapped"),
            RunState::Bootstrapped => write!(f, "bootstrapped"),
            RunState::Applying(i) => write!(f, "applying #{i}"),
            RunState::Complete => write!(f, "complete"),
            RunState::Failed(i) => write!(f, "failed at #{i}"),
        }
    }
}
