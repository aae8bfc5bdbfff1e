//! # Arbor Internal Library
//!
//! Re-exports the core Arbor crates for convenience.

/// Layer 1: Configuration, time, blackboard and tracing.
pub use arbor_core;

/// Layer 2: Node graph store, link resolution and hooks.
pub use arbor_graph;

/// Layer 3: Behaviour tree interpreter.
pub use arbor_behaviour_tree;

/// Layer 3: Finite state machine interpreter.
pub use arbor_state_machine;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use arbor_behaviour_tree::prelude::*;
    pub use arbor_core::{Blackboard, FrameClock, FsmConfig, RuntimeConfig, TreeConfig};
    pub use arbor_graph::prelude::*;
    pub use arbor_state_machine::prelude::*;
}
