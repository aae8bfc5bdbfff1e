//! States and the behaviours attached to them.
//!
//! A [`State`] is the payload of an FSM graph node. It carries an ordered
//! list of [`StateBehaviour`]s which receive the state's lifecycle callbacks
//! in attachment order:
//!
//! - [`on_awake`](StateBehaviour::on_awake) the first time the state is entered
//! - [`on_state_begin`](StateBehaviour::on_state_begin) on every entry
//! - [`on_state_update`](StateBehaviour::on_state_update) and
//!   [`on_state_late_update`](StateBehaviour::on_state_late_update) every frame while active
//! - [`on_state_end`](StateBehaviour::on_state_end) when the state is left

use core::fmt;

use arbor_graph::link::{NodeLink, NodeLinks};
use downcast_rs::{Downcast, impl_downcast};

use crate::context::StateContext;
use crate::link::StateLink;

/// Behaviour attached to a state.
pub trait StateBehaviour: Downcast + Send {
    /// Called once, before the first [`on_state_begin`](Self::on_state_begin).
    fn on_awake(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when the state is entered.
    fn on_state_begin(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called every update while the state is active.
    fn on_state_update(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called every late update while the state is active.
    fn on_state_late_update(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when the state is left, by transition or by stopping.
    fn on_state_end(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when the machine is paused while the state is active.
    fn on_pause(&mut self) {}

    /// Called when the machine resumes.
    fn on_resume(&mut self) {}

    /// Returns the outgoing links this behaviour owns.
    fn state_links(&self) -> Vec<&StateLink> {
        Vec::new()
    }
}

impl_downcast!(StateBehaviour);

/// Payload of an FSM node.
#[derive(Default)]
pub struct State {
    pub(crate) behaviours: Vec<Box<dyn StateBehaviour>>,
    pub(crate) resident: bool,
    pub(crate) break_point: bool,
    pub(crate) transition_count: u32,
    pub(crate) awakened: bool,
}

impl State {
    /// Creates a regular state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resident state, which is always active while the machine
    /// runs and is never the target of a transition.
    #[must_use]
    pub fn resident() -> Self {
        Self {
            resident: true,
            ..Self::default()
        }
    }

    /// Returns the attached behaviours in call order.
    #[must_use]
    pub fn behaviours(&self) -> &[Box<dyn StateBehaviour>] {
        &self.behaviours
    }

    /// Returns whether this is a resident state.
    #[must_use]
    pub fn is_resident(&self) -> bool {
        self.resident
    }

    /// Returns whether entering this state triggers a break point.
    #[must_use]
    pub fn break_point(&self) -> bool {
        self.break_point
    }

    /// Returns how many times the state has been entered.
    #[must_use]
    pub fn transition_count(&self) -> u32 {
        self.transition_count
    }

    /// Returns the first attached behaviour of type `T`.
    #[must_use]
    pub fn behaviour<T: StateBehaviour>(&self) -> Option<&T> {
        self.behaviours
            .iter()
            .find_map(|behaviour| behaviour.downcast_ref::<T>())
    }

    /// Returns the first attached behaviour of type `T` mutably.
    pub fn behaviour_mut<T: StateBehaviour>(&mut self) -> Option<&mut T> {
        self.behaviours
            .iter_mut()
            .find_map(|behaviour| behaviour.downcast_mut::<T>())
    }
}

impl NodeLinks for State {
    fn links(&self) -> Vec<NodeLink> {
        self.behaviours
            .iter()
            .flat_map(|behaviour| behaviour.state_links())
            .map(|link| link.target)
            .collect()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("behaviours", &self.behaviours.len())
            .field("resident", &self.resident)
            .field("break_point", &self.break_point)
            .field("transition_count", &self.transition_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_graph::node::NodeId;

    use crate::link::TransitionTiming;

    struct Linked(StateLink, StateLink);

    impl StateBehaviour for Linked {
        fn state_links(&self) -> Vec<&StateLink> {
            vec![&self.0, &self.1]
        }
    }

    struct Plain;

    impl StateBehaviour for Plain {}

    #[test]
    fn links_collect_every_behaviour() {
        let target = NodeId::from_raw(3).unwrap();
        let mut state = State::new();
        state.behaviours.push(Box::new(Plain));
        state.behaviours.push(Box::new(Linked(
            StateLink::new("a", TransitionTiming::Immediate).with_target(target),
            StateLink::default(),
        )));

        assert_eq!(state.links(), [NodeLink::to(target), NodeLink::UNCONNECTED]);
    }

    #[test]
    fn typed_lookup_finds_first_match() {
        let mut state = State::resident();
        state.behaviours.push(Box::new(Plain));
        assert!(state.is_resident());
        assert!(state.behaviour::<Plain>().is_some());
        assert!(state.behaviour::<Linked>().is_none());
    }
}
