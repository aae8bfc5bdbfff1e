//! Finite state machine interpreter for Arbor (Layer 3).
//!
//! A [`StateMachine`](machine::StateMachine) runs a graph of
//! [`State`](state::State)s stored in an [`arbor_graph::graph::NodeGraph`].
//! Exactly one regular state is current at a time; resident states run
//! alongside it. Behaviours attached to states request transitions along
//! [`StateLink`](link::StateLink)s, and each link's
//! [`TransitionTiming`](link::TransitionTiming) decides whether the
//! transition happens immediately or is reserved for a later point in the
//! frame.
//!
//! # Core Concepts
//!
//! - [`StateMachine`](machine::StateMachine) - Current state, host API and transition application
//! - [`StateBehaviour`](state::StateBehaviour) - State lifecycle callbacks
//! - [`TransitionReservation`](reservation::TransitionReservation) - The single pending-transition slot
//! - [`TransitionHistory`](history::TransitionHistory) - Bounded log of applied transitions
//! - [`StateLinkRecord`](record::StateLinkRecord) - Versioned persisted links
//!
//! # Architecture
//!
//! - **Layer 1** (`arbor_core`): configuration, time, blackboard, tracing
//! - **Layer 2** (`arbor_graph`): node store, link resolution, hooks
//! - **Layer 3** (`arbor_behaviour_tree`, `arbor_state_machine`): graph interpreters (this crate)

/// Built-in state behaviours.
pub mod behaviours;

/// Per-call context for state behaviours.
pub mod context;

/// State machine errors.
pub mod error;

/// Applied transition log.
pub mod history;

/// State links and transition timing.
pub mod link;

/// The state machine runtime.
pub mod machine;

/// Versioned link records.
pub mod record;

/// The reserved-transition slot.
pub mod reservation;

/// States and state behaviours.
pub mod state;

/// Common imports for building and running state machines.
pub mod prelude {
    pub use crate::behaviours::{FlagTransition, TimeTransition};
    pub use crate::context::StateContext;
    pub use crate::error::StateMachineError;
    pub use crate::history::{TransitionHistory, TransitionRecord};
    pub use crate::link::{ReconcilePoint, StateLink, TransitionTiming};
    pub use crate::machine::StateMachine;
    pub use crate::record::StateLinkRecord;
    pub use crate::reservation::{
        ReserveOutcome, ReservedTransition, TransitionRequest, TransitionReservation,
    };
    pub use crate::state::{State, StateBehaviour};
    pub use arbor_graph::instance::PlayState;
}

pub use error::StateMachineError;
pub use machine::StateMachine;
