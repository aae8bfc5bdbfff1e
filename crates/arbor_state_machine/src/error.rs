//! Errors returned by state machine authoring and hosting APIs.

use arbor_graph::GraphError;
use arbor_graph::node::NodeId;

/// Errors produced while building or driving a [`StateMachine`](crate::machine::StateMachine).
///
/// Transition requests never return these; a bad request is logged and
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// No node with this id exists.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    /// The node is a reroute, not a state.
    #[error("node {0} is not a state")]
    NotAState(NodeId),
    /// Resident states cannot be the start state.
    #[error("resident state {0} cannot be the start state")]
    ResidentStartState(NodeId),
    /// The machine has no start state to enter.
    #[error("state machine has no start state")]
    NoStartState,
    /// An underlying graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
