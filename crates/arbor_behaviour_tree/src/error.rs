//! Errors returned by behaviour tree authoring and hosting APIs.

use arbor_graph::GraphError;
use arbor_graph::node::{BranchId, NodeId};

/// Errors produced while building or driving a [`BehaviourTree`](crate::tree::BehaviourTree).
///
/// Nothing on the tick path returns these; a malformed node fails locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No node with this id exists.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    /// The node cannot have children.
    #[error("node {0} cannot have children")]
    NotAParent(NodeId),
    /// The root already has a child.
    #[error("root {0} already has a child")]
    RootOccupied(NodeId),
    /// The root node cannot be removed.
    #[error("the root node {0} cannot be removed")]
    CannotRemoveRoot(NodeId),
    /// The root node cannot carry decorators.
    #[error("the root node {0} cannot be decorated")]
    RootDecorator(NodeId),
    /// The composite has no child edge with this branch id.
    #[error("node {node} has no branch {branch}")]
    BranchNotFound {
        /// The parent node.
        node: NodeId,
        /// The missing branch.
        branch: BranchId,
    },
    /// No policy is registered under this name.
    #[error("unknown composite policy '{0}'")]
    UnknownPolicy(String),
    /// A policy is already registered under this name.
    #[error("composite policy '{0}' is already registered")]
    DuplicatePolicy(String),
    /// An underlying graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
