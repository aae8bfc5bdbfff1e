//! Node graph primitives for Arbor (Layer 2).
//!
//! `arbor_graph` provides the storage and link model shared by the behaviour
//! tree and state machine interpreters. Nodes live in an arena keyed by
//! stable ids, and every link is an id reference that may be unconnected or
//! point at a removed node.
//!
//! # Core Concepts
//!
//! - [`NodeGraph`] - Arena of nodes with never-reused ids
//! - [`NodeLink`] - Id reference between nodes, possibly unconnected
//! - [`resolve`](resolver::resolve) - Follows reroute chains with cycle detection
//! - [`HooksAPI`](hooks::HooksAPI) - Lifecycle observers for running graphs
//! - [`Migrate`](migrate::Migrate) - Versioned upgrade chain for persisted records
//!
//! # Example
//!
//! ```
//! use arbor_graph::prelude::*;
//!
//! let mut graph: NodeGraph<&str> = NodeGraph::new();
//! let target = graph.add_node("target", "payload");
//! let bend = graph.add_reroute("bend", NodeLink::to(target));
//!
//! assert_eq!(resolve(&graph, NodeLink::to(bend)), Resolution::Resolved(target));
//!
//! graph.remove_node(target);
//! assert_eq!(resolve(&graph, NodeLink::to(bend)).target(), None);
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`arbor_core`): configuration, time, blackboard, tracing
//! - **Layer 2** (`arbor_graph`): node store, link resolution, hooks (this crate)
//! - **Layer 3** (`arbor_behaviour_tree`, `arbor_state_machine`): graph interpreters

/// Errors for graph editing and validation.
pub mod error;

/// Node store and id allocation.
pub mod graph;

/// Lifecycle hooks for running graphs.
pub mod hooks;

/// Graph instance identity.
pub mod instance;

/// Links between nodes.
pub mod link;

/// Versioned record migration.
pub mod migrate;

/// Node identity and kinds.
pub mod node;

/// Reroute chain resolution.
pub mod resolver;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::error::{GraphError, ValidationError};
    pub use crate::graph::{IdAllocator, NodeGraph};
    pub use crate::hooks::{ExitReason, GraphEvent, HooksAPI};
    pub use crate::instance::{GraphInstanceId, PlayState};
    pub use crate::link::{NodeLink, NodeLinkSlot, NodeLinks};
    pub use crate::migrate::{Migrate, MigrationError, load_versioned, save_versioned};
    pub use crate::node::{BranchId, GraphNode, NodeId, NodeKind, RerouteDirection, RerouteNode};
    pub use crate::resolver::{Resolution, check_loop, resolve};
}

pub use error::{GraphError, ValidationError};
pub use graph::NodeGraph;
pub use instance::{GraphInstanceId, PlayState};
pub use link::NodeLink;
pub use node::NodeId;
