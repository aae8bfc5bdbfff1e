//! A runtime for hierarchical behaviour graphs in Rust.
//!
//! Arbor interprets two kinds of graph over one node store: behaviour trees
//! ([`arbor_behaviour_tree`]) and finite state machines
//! ([`arbor_state_machine`]). Both are frame-driven and single-threaded; the
//! host calls `tick` once per frame.
//!
//! ```
//! use arbor::prelude::*;
//!
//! let mut tree = BehaviourTree::new();
//! let selector = tree.add_composite("Selector", Selector);
//! let idle = tree.add_action("Idle", Constant(NodeStatus::Success));
//! tree.connect(tree.root(), selector, 0).unwrap();
//! tree.connect(selector, idle, 0).unwrap();
//!
//! tree.play();
//! assert_eq!(tree.tick().finished, Some(NodeStatus::Success));
//!
//! let mut fsm = StateMachine::new();
//! let patrol = fsm.add_state("Patrol");
//! fsm.start().unwrap();
//! assert_eq!(fsm.tick(), Some(patrol));
//! ```

pub use arbor_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use arbor_internal::prelude::*;
}
