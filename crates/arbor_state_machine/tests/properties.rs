//! Property tests for the reservation slot.

use arbor_graph::link::NodeLink;
use arbor_graph::node::NodeId;
use arbor_state_machine::prelude::*;
use proptest::prelude::*;

fn timing() -> impl Strategy<Value = TransitionTiming> {
    prop_oneof![
        Just(TransitionTiming::Immediate),
        Just(TransitionTiming::LateUpdateOverwrite),
        Just(TransitionTiming::LateUpdateDontOverwrite),
        Just(TransitionTiming::NextUpdateOverwrite),
        Just(TransitionTiming::NextUpdateDontOverwrite),
    ]
}

proptest! {
    /// The slot holds the last overwrite request, or failing that the first
    /// don't-overwrite request; immediate requests never land in it.
    #[test]
    fn slot_follows_overwrite_law(timings in prop::collection::vec(timing(), 0..32)) {
        let mut slot = TransitionReservation::new();
        let mut expected: Option<usize> = None;

        for (i, timing) in timings.iter().copied().enumerate() {
            let request = TransitionRequest {
                from: NodeId::from_raw(1).unwrap(),
                link_name: i.to_string(),
                target: NodeLink::from_raw(2),
                timing,
            };
            let outcome = slot.reserve(request);

            let taken = timing != TransitionTiming::Immediate
                && (timing.overwrites() || expected.is_none());
            match (taken, expected.is_some()) {
                (true, true) => prop_assert_eq!(outcome, ReserveOutcome::Replaced),
                (true, false) => prop_assert_eq!(outcome, ReserveOutcome::Reserved),
                (false, _) => prop_assert_eq!(outcome, ReserveOutcome::Dropped),
            }
            if taken {
                expected = Some(i);
            }
        }

        let held = slot.pending().map(|reserved| reserved.request.link_name.clone());
        prop_assert_eq!(held, expected.map(|i| i.to_string()));
        if let Some(reserved) = slot.pending() {
            prop_assert_eq!(Some(reserved.point), reserved.request.timing.reconcile_point());
        }
    }
}
