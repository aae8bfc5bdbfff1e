//! State links and transition timing.
//!
//! A [`StateLink`] is owned by a [`StateBehaviour`](crate::state::StateBehaviour)
//! and names the state a transition goes to. Its [`TransitionTiming`] decides
//! when a requested transition takes effect.

use core::fmt;

use arbor_graph::link::NodeLink;
use arbor_graph::node::NodeId;
use serde::{Deserialize, Serialize};

/// When a requested transition takes effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTiming {
    /// Applied as soon as the request is processed.
    Immediate,
    /// Applied at the end of late update, replacing any reservation.
    LateUpdateOverwrite,
    /// Applied at the end of late update unless a reservation already exists.
    #[default]
    LateUpdateDontOverwrite,
    /// Applied at the start of the next update, replacing any reservation.
    NextUpdateOverwrite,
    /// Applied at the start of the next update unless a reservation already
    /// exists.
    NextUpdateDontOverwrite,
}

impl TransitionTiming {
    /// Returns the timing that reserves for `point` with overwrite.
    #[must_use]
    pub fn overwriting(point: ReconcilePoint) -> Self {
        match point {
            ReconcilePoint::LateUpdate => Self::LateUpdateOverwrite,
            ReconcilePoint::NextUpdate => Self::NextUpdateOverwrite,
        }
    }

    /// Returns where a reservation with this timing is applied.
    ///
    /// `None` for [`Immediate`](Self::Immediate), which never enters the
    /// reservation slot.
    #[must_use]
    pub fn reconcile_point(self) -> Option<ReconcilePoint> {
        match self {
            Self::Immediate => None,
            Self::LateUpdateOverwrite | Self::LateUpdateDontOverwrite => {
                Some(ReconcilePoint::LateUpdate)
            }
            Self::NextUpdateOverwrite | Self::NextUpdateDontOverwrite => {
                Some(ReconcilePoint::NextUpdate)
            }
        }
    }

    /// Returns whether a request with this timing replaces an existing
    /// reservation.
    #[must_use]
    pub fn overwrites(self) -> bool {
        matches!(
            self,
            Self::Immediate | Self::LateUpdateOverwrite | Self::NextUpdateOverwrite
        )
    }
}

/// The two points in a frame where reserved transitions are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcilePoint {
    /// End of [`StateMachine::late_update`](crate::machine::StateMachine::late_update).
    LateUpdate,
    /// Start of the following [`StateMachine::update`](crate::machine::StateMachine::update).
    NextUpdate,
}

impl fmt::Display for ReconcilePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LateUpdate => f.write_str("late_update"),
            Self::NextUpdate => f.write_str("next_update"),
        }
    }
}

/// An outgoing transition edge owned by a state behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLink {
    /// Display name, reported in hook events and history.
    pub name: String,
    /// Target state, possibly through reroutes.
    pub target: NodeLink,
    /// When the transition takes effect.
    pub timing: TransitionTiming,
}

impl StateLink {
    /// Creates an unconnected link.
    #[must_use]
    pub fn new(name: impl Into<String>, timing: TransitionTiming) -> Self {
        Self {
            name: name.into(),
            target: NodeLink::UNCONNECTED,
            timing,
        }
    }

    /// Points the link at `target`.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<NodeLink>) -> Self {
        self.target = target.into();
        self
    }

    /// Points the link at `target`.
    pub fn connect(&mut self, target: NodeId) {
        self.target.connect(target);
    }

    /// Clears the target.
    pub fn disconnect(&mut self) {
        self.target.disconnect();
    }
}

impl Default for StateLink {
    fn default() -> Self {
        Self::new("Transition", TransitionTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_is_late_update_without_overwrite() {
        let timing = TransitionTiming::default();
        assert_eq!(timing, TransitionTiming::LateUpdateDontOverwrite);
        assert_eq!(timing.reconcile_point(), Some(ReconcilePoint::LateUpdate));
        assert!(!timing.overwrites());
    }

    #[test]
    fn immediate_has_no_reconcile_point() {
        assert_eq!(TransitionTiming::Immediate.reconcile_point(), None);
    }

    #[test]
    fn timing_serializes_as_snake_case() {
        let json = serde_json::to_string(&TransitionTiming::NextUpdateDontOverwrite).unwrap();
        assert_eq!(json, "\"next_update_dont_overwrite\"");
    }

    #[test]
    fn overwriting_matches_point() {
        for point in [ReconcilePoint::LateUpdate, ReconcilePoint::NextUpdate] {
            let timing = TransitionTiming::overwriting(point);
            assert!(timing.overwrites());
            assert_eq!(timing.reconcile_point(), Some(point));
        }
    }

    #[test]
    fn link_connects_and_disconnects() {
        let target = NodeId::from_raw(4).unwrap();
        let mut link = StateLink::new("Go", TransitionTiming::Immediate).with_target(target);
        assert_eq!(link.target.target(), Some(target));
        link.disconnect();
        assert!(!link.target.is_connected());
    }
}
