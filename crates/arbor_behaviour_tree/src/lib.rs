//! Behaviour tree interpreter for Arbor (Layer 3).
//!
//! A [`BehaviourTree`](tree::BehaviourTree) runs a graph of composite and
//! action nodes stored in an [`arbor_graph::graph::NodeGraph`]. Composites
//! pick children through a pluggable [`CompositePolicy`](policy::CompositePolicy);
//! actions do the work. Decorators gate entry into nodes and, with
//! [`AbortFlags`](decorator::AbortFlags), abort running branches when
//! conditions change.
//!
//! # Core Concepts
//!
//! - [`BehaviourTree`](tree::BehaviourTree) - Execution stack, priorities and host API
//! - [`CompositeNode`](composite::CompositeNode) - Ordered children and the running index
//! - [`PolicyRegistry`](policy::PolicyRegistry) - Built-in and custom child-selection policies
//! - [`ActionBehaviour`](action::ActionBehaviour) - Leaf behaviour lifecycle
//! - [`Decorator`](decorator::Decorator) - Entry conditions and conditional aborts
//!
//! # Architecture
//!
//! - **Layer 1** (`arbor_core`): configuration, time, blackboard, tracing
//! - **Layer 2** (`arbor_graph`): node store, link resolution, hooks
//! - **Layer 3** (`arbor_behaviour_tree`, `arbor_state_machine`): graph interpreters (this crate)

/// Leaf behaviours.
pub mod action;

/// Composite nodes.
pub mod composite;

/// Per-call context for behaviours.
pub mod context;

/// Node conditions and abort flags.
pub mod decorator;

/// Tree errors.
pub mod error;

/// Tree node payloads.
pub mod node;

/// Child-selection policies.
pub mod policy;

/// Node execution status.
pub mod status;

/// The tree runtime.
pub mod tree;

/// Common imports for building and running behaviour trees.
pub mod prelude {
    pub use crate::action::{ActionBehaviour, Constant, FnAction, Wait};
    pub use crate::composite::{CompositeNode, CompositeStep};
    pub use crate::context::TickContext;
    pub use crate::decorator::{AbortFlags, BlackboardCondition, Decorator, FnCondition};
    pub use crate::error::TreeError;
    pub use crate::node::{TreeNode, TreeNodeKind};
    pub use crate::policy::{
        CompositePolicy, MemorySelector, MemorySequence, Parallel, ParallelPolicy,
        PolicyRegistry, Selector, Sequence,
    };
    pub use crate::status::NodeStatus;
    pub use crate::tree::{BehaviourTree, TickResult};
    pub use arbor_graph::instance::PlayState;
}

pub use error::TreeError;
pub use status::NodeStatus;
pub use tree::BehaviourTree;
