//! Built-in state behaviours.

use core::time::Duration;

use crate::context::StateContext;
use crate::link::StateLink;
use crate::state::StateBehaviour;

/// Transitions after the state has been active for a fixed amount of
/// machine time.
///
/// Time is measured with the machine's frame clock, so a paused machine
/// does not advance the timer.
#[derive(Debug, Clone)]
pub struct TimeTransition {
    /// Where to go when the time is up.
    pub link: StateLink,
    duration: Duration,
    elapsed: Duration,
}

impl TimeTransition {
    /// Creates a timer of `duration` that fires `link`.
    #[must_use]
    pub fn new(duration: Duration, link: StateLink) -> Self {
        Self {
            link,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns how long the state has been active since it was entered.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl StateBehaviour for TimeTransition {
    fn on_state_begin(&mut self, _ctx: &mut StateContext<'_>) {
        self.elapsed = Duration::ZERO;
    }

    fn on_state_update(&mut self, ctx: &mut StateContext<'_>) {
        self.elapsed += ctx.delta;
        if self.elapsed >= self.duration {
            ctx.transition(&self.link);
        }
    }

    fn state_links(&self) -> Vec<&StateLink> {
        vec![&self.link]
    }
}

/// Transitions on every update while a blackboard flag is set.
#[derive(Debug, Clone)]
pub struct FlagTransition {
    /// Where to go when the flag is set.
    pub link: StateLink,
    key: String,
}

impl FlagTransition {
    /// Watches the blackboard entry `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, link: StateLink) -> Self {
        Self {
            link,
            key: key.into(),
        }
    }
}

impl StateBehaviour for FlagTransition {
    fn on_state_update(&mut self, ctx: &mut StateContext<'_>) {
        if ctx.blackboard.flag(&self.key) {
            ctx.transition(&self.link);
        }
    }

    fn state_links(&self) -> Vec<&StateLink> {
        vec![&self.link]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{Blackboard, FrameClock};
    use arbor_graph::node::NodeId;

    use crate::link::TransitionTiming;

    #[test]
    fn time_transition_fires_once_elapsed() {
        let state = NodeId::from_raw(1).unwrap();
        let link = StateLink::new("Timeout", TransitionTiming::Immediate)
            .with_target(NodeId::from_raw(2).unwrap());
        let mut timer = TimeTransition::new(Duration::from_millis(30), link);
        let mut board = Blackboard::new();
        let mut requests = Vec::new();
        let clock = FrameClock::default();
        let mut ctx = StateContext::new(&mut board, &clock, state, &mut requests);

        timer.on_state_begin(&mut ctx);
        ctx.delta = Duration::from_millis(20);
        timer.on_state_update(&mut ctx);
        timer.on_state_update(&mut ctx);

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].from, state);
        assert_eq!(requests[0].link_name, "Timeout");
    }

    #[test]
    fn flag_transition_waits_for_flag() {
        let state = NodeId::from_raw(1).unwrap();
        let mut watcher = FlagTransition::new("alarm", StateLink::default());
        let mut board = Blackboard::new();
        let mut requests = Vec::new();
        let clock = FrameClock::default();

        watcher.on_state_update(&mut StateContext::new(&mut board, &clock, state, &mut requests));
        board.set("alarm", true);
        watcher.on_state_update(&mut StateContext::new(&mut board, &clock, state, &mut requests));

        assert_eq!(requests.len(), 1);
    }
}
