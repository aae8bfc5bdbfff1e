//! Schedule markers for graph lifecycle events.
//!
//! These marker types identify when hooks are invoked while a graph runs.
//! Use them with [`ScheduleId::of::<T>()`](ScheduleId::of) for registration,
//! or use the type-safe registration methods like
//! [`register_observer::<OnNodeEnter>`](super::HooksAPI::register_observer).
//!
//! Event data is provided via the unified
//! [`GraphEvent`](super::events::GraphEvent) enum, which all hooks receive.

use core::any::TypeId;
use variadics_please::all_tuples;

/// Identifier for a hook schedule, derived from a marker type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ScheduleId {
    /// Creates a `ScheduleId` for the given schedule marker type.
    #[must_use]
    pub fn of<S: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            type_name: core::any::type_name::<S>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Marker trait for schedule types.
pub trait Schedule: 'static {}

/// Types that name one or more schedules.
///
/// Implemented for single schedules and tuples of up to 16 schedules.
pub trait IntoScheduleIds {
    /// Returns the schedule IDs for this type.
    fn schedule_ids() -> Vec<ScheduleId>;
}

impl<S: Schedule> IntoScheduleIds for S {
    fn schedule_ids() -> Vec<ScheduleId> {
        vec![ScheduleId::of::<S>()]
    }
}

macro_rules! impl_into_schedule_ids_for_tuple {
    ($($S:ident),*) => {
        impl<$($S: Schedule),*> IntoScheduleIds for ($($S,)*) {
            fn schedule_ids() -> Vec<ScheduleId> {
                vec![$(ScheduleId::of::<$S>()),*]
            }
        }
    };
}

all_tuples!(impl_into_schedule_ids_for_tuple, 2, 16, S);

// ─────────────────────────────────────────────────────────────────────────────
// Graph-Level Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Hooks called when a graph starts playing.
///
/// Event data: [`GraphEvent::GraphStart`](super::events::GraphEvent::GraphStart)
pub struct OnGraphStart;
impl Schedule for OnGraphStart {}

/// Hooks called when a graph stops and resets.
///
/// Event data: [`GraphEvent::GraphStop`](super::events::GraphEvent::GraphStop)
pub struct OnGraphStop;
impl Schedule for OnGraphStop {}

/// Hooks called when a graph is paused.
///
/// Event data: [`GraphEvent::GraphPaused`](super::events::GraphEvent::GraphPaused)
pub struct OnGraphPaused;
impl Schedule for OnGraphPaused {}

/// Hooks called when a paused graph resumes.
///
/// Event data: [`GraphEvent::GraphResumed`](super::events::GraphEvent::GraphResumed)
pub struct OnGraphResumed;
impl Schedule for OnGraphResumed {}

// ─────────────────────────────────────────────────────────────────────────────
// Node Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Hooks called when a node becomes active (tree node entered, state begun).
///
/// Event data: [`GraphEvent::NodeEnter`](super::events::GraphEvent::NodeEnter)
pub struct OnNodeEnter;
impl Schedule for OnNodeEnter {}

/// Hooks called when a node stops being active.
///
/// Event data: [`GraphEvent::NodeExit`](super::events::GraphEvent::NodeExit)
pub struct OnNodeExit;
impl Schedule for OnNodeExit {}

/// Hooks called when a higher-priority branch interrupts a running one.
///
/// Event data: [`GraphEvent::Interrupt`](super::events::GraphEvent::Interrupt)
pub struct OnInterrupt;
impl Schedule for OnInterrupt {}

// ─────────────────────────────────────────────────────────────────────────────
// Transition Schedules
// ─────────────────────────────────────────────────────────────────────────────

/// Hooks called after a state machine applies a transition.
///
/// Event data: [`GraphEvent::TransitionApplied`](super::events::GraphEvent::TransitionApplied)
pub struct OnTransitionApplied;
impl Schedule for OnTransitionApplied {}

/// Hooks called when a transition request is discarded.
///
/// Event data: [`GraphEvent::TransitionDropped`](super::events::GraphEvent::TransitionDropped)
pub struct OnTransitionDropped;
impl Schedule for OnTransitionDropped {}

/// Hooks called when a state flagged as a break point is entered.
///
/// Event data: [`GraphEvent::BreakPoint`](super::events::GraphEvent::BreakPoint)
pub struct OnBreakPoint;
impl Schedule for OnBreakPoint {}
