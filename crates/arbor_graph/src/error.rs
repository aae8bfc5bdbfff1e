//! Errors produced by graph authoring operations.

use crate::node::NodeId;

/// Errors returned when editing a [`NodeGraph`](crate::graph::NodeGraph).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node with this id already exists.
    #[error("node {0} already exists")]
    DuplicateNodeId(NodeId),
    /// Every node or branch id has been handed out.
    #[error("id space exhausted")]
    IdSpaceExhausted,
    /// No node with this id exists.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    /// The node is not a reroute node.
    #[error("node {0} is not a reroute node")]
    NotAReroute(NodeId),
    /// Connecting the reroute would create a reroute cycle.
    #[error("connecting reroute {from} to {to} would create a loop")]
    WouldCreateLoop {
        /// Reroute being connected.
        from: NodeId,
        /// Proposed target.
        to: NodeId,
    },
}

/// Problems found by [`NodeGraph::validate`](crate::graph::NodeGraph::validate).
///
/// These are warnings for the authoring layer. A graph with validation
/// errors still ticks; the offending links behave as unconnected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A reroute node is part of a reroute cycle.
    #[error("reroute {node} is part of a reroute cycle")]
    RerouteCycle {
        /// A reroute on the cycle.
        node: NodeId,
    },
    /// A link names a node that does not exist.
    #[error("node {node} links to missing node {target}")]
    DanglingLink {
        /// Node owning the link.
        node: NodeId,
        /// Missing target.
        target: NodeId,
    },
    /// A link is not connected.
    #[error("node {node} has an unconnected link")]
    UnconnectedLink {
        /// Node owning the link.
        node: NodeId,
    },
}
