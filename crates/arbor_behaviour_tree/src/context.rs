//! Per-call context handed to actions and decorators.

use core::time::Duration;

use arbor_core::Blackboard;

/// What a behaviour can see and touch while the tree runs it.
#[derive(Debug)]
pub struct TickContext<'a> {
    /// The tree's blackboard.
    pub blackboard: &'a mut Blackboard,
    /// Time since the previous tick; zero on the first tick after play or resume.
    pub delta: Duration,
    /// Unpaused time since the tree started playing.
    pub elapsed: Duration,
    /// Number of ticks run since the tree started playing.
    pub frame: u64,
}

impl<'a> TickContext<'a> {
    /// Creates a context with zero time, for driving behaviours outside a tree.
    #[must_use]
    pub fn detached(blackboard: &'a mut Blackboard) -> Self {
        Self {
            blackboard,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame: 0,
        }
    }
}
