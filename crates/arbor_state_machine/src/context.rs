//! Per-call context handed to state behaviours.

use core::time::Duration;

use arbor_core::{Blackboard, FrameClock};
use arbor_graph::node::NodeId;

use crate::link::StateLink;
use crate::reservation::TransitionRequest;

/// What a state behaviour can see and touch while the machine runs it.
#[derive(Debug)]
pub struct StateContext<'a> {
    /// The machine's blackboard.
    pub blackboard: &'a mut Blackboard,
    /// Time since the previous update; zero on the first update after start
    /// or resume.
    pub delta: Duration,
    /// Unpaused time since the machine started.
    pub elapsed: Duration,
    /// Number of updates run since the machine started.
    pub frame: u64,
    state: NodeId,
    requests: &'a mut Vec<TransitionRequest>,
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(
        blackboard: &'a mut Blackboard,
        clock: &FrameClock,
        state: NodeId,
        requests: &'a mut Vec<TransitionRequest>,
    ) -> Self {
        Self {
            blackboard,
            delta: clock.delta(),
            elapsed: clock.elapsed(),
            frame: clock.frame(),
            state,
            requests,
        }
    }

    /// Returns the state the behaviour belongs to.
    #[must_use]
    pub fn state(&self) -> NodeId {
        self.state
    }

    /// Requests a transition along `link`.
    ///
    /// The request is processed as soon as the current callback returns.
    pub fn transition(&mut self, link: &StateLink) {
        self.requests.push(TransitionRequest::new(self.state, link));
    }
}
