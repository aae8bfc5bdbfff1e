//! The single reserved-transition slot.
//!
//! A state machine holds at most one pending transition. Requests with an
//! overwrite timing always take the slot; the others only take it when it
//! is empty. [`TransitionTiming::Immediate`] requests are applied by the
//! machine directly and never stored here.

use arbor_graph::link::NodeLink;
use arbor_graph::node::NodeId;

use crate::link::{ReconcilePoint, StateLink, TransitionTiming};

/// A transition asked for by a state behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// State that issued the request.
    pub from: NodeId,
    /// Name of the link.
    pub link_name: String,
    /// Target state.
    pub target: NodeLink,
    /// When the transition takes effect.
    pub timing: TransitionTiming,
}

impl TransitionRequest {
    /// Builds a request for `link` issued by `from`.
    #[must_use]
    pub fn new(from: NodeId, link: &StateLink) -> Self {
        Self {
            from,
            link_name: link.name.clone(),
            target: link.target,
            timing: link.timing,
        }
    }
}

/// A request held in the slot, with the point it will be applied at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedTransition {
    /// The request.
    pub request: TransitionRequest,
    /// Where it is applied.
    pub point: ReconcilePoint,
}

/// Result of [`TransitionReservation::reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The slot was empty and now holds the request.
    Reserved,
    /// The request replaced an earlier reservation.
    Replaced,
    /// The request was discarded.
    Dropped,
}

/// Holds at most one pending transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionReservation {
    slot: Option<ReservedTransition>,
}

impl TransitionReservation {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a request to the slot.
    ///
    /// Overwrite timings always win. Don't-overwrite timings only fill an
    /// empty slot. Immediate requests are dropped.
    pub fn reserve(&mut self, request: TransitionRequest) -> ReserveOutcome {
        let Some(point) = request.timing.reconcile_point() else {
            return ReserveOutcome::Dropped;
        };
        let occupied = self.slot.is_some();
        if occupied && !request.timing.overwrites() {
            return ReserveOutcome::Dropped;
        }

        self.slot = Some(ReservedTransition { request, point });
        if occupied {
            ReserveOutcome::Replaced
        } else {
            ReserveOutcome::Reserved
        }
    }

    /// Removes and returns the reservation if it is due at `point`.
    pub fn take_due(&mut self, point: ReconcilePoint) -> Option<ReservedTransition> {
        self.slot.take_if(|reserved| reserved.point == point)
    }

    /// Returns the pending reservation.
    #[must_use]
    pub fn pending(&self) -> Option<&ReservedTransition> {
        self.slot.as_ref()
    }

    /// Discards the pending reservation.
    pub fn clear(&mut self) -> Option<ReservedTransition> {
        self.slot.take()
    }

    /// Returns whether nothing is reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, timing: TransitionTiming) -> TransitionRequest {
        TransitionRequest {
            from: NodeId::from_raw(1).unwrap(),
            link_name: name.to_string(),
            target: NodeLink::from_raw(2),
            timing,
        }
    }

    fn pending_name(reservation: &TransitionReservation) -> Option<&str> {
        reservation
            .pending()
            .map(|reserved| reserved.request.link_name.as_str())
    }

    #[test]
    fn dont_overwrite_then_overwrite_keeps_overwrite() {
        let mut slot = TransitionReservation::new();
        assert_eq!(
            slot.reserve(request("a", TransitionTiming::LateUpdateDontOverwrite)),
            ReserveOutcome::Reserved
        );
        assert_eq!(
            slot.reserve(request("b", TransitionTiming::NextUpdateOverwrite)),
            ReserveOutcome::Replaced
        );
        assert_eq!(pending_name(&slot), Some("b"));
        assert_eq!(
            slot.pending().map(|reserved| reserved.point),
            Some(ReconcilePoint::NextUpdate)
        );
    }

    #[test]
    fn dont_overwrite_twice_keeps_first() {
        let mut slot = TransitionReservation::new();
        slot.reserve(request("a", TransitionTiming::NextUpdateDontOverwrite));
        assert_eq!(
            slot.reserve(request("b", TransitionTiming::LateUpdateDontOverwrite)),
            ReserveOutcome::Dropped
        );
        assert_eq!(pending_name(&slot), Some("a"));
    }

    #[test]
    fn immediate_never_enters_the_slot() {
        let mut slot = TransitionReservation::new();
        assert_eq!(
            slot.reserve(request("now", TransitionTiming::Immediate)),
            ReserveOutcome::Dropped
        );
        assert!(slot.is_empty());
    }

    #[test]
    fn take_due_only_at_matching_point() {
        let mut slot = TransitionReservation::new();
        slot.reserve(request("a", TransitionTiming::NextUpdateOverwrite));

        assert!(slot.take_due(ReconcilePoint::LateUpdate).is_none());
        assert!(!slot.is_empty());
        assert_eq!(
            slot.take_due(ReconcilePoint::NextUpdate)
                .map(|reserved| reserved.request.link_name),
            Some("a".to_string())
        );
        assert!(slot.is_empty());
    }
}
