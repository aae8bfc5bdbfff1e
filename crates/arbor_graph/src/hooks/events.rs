//! Unified event enum for graph lifecycle hooks.
//!
//! All hooks receive `&GraphEvent` and can match on variants for typed access.
//!
//! ```
//! use arbor_graph::hooks::GraphEvent;
//!
//! fn handle_event(event: &GraphEvent) {
//!     match event {
//!         GraphEvent::NodeEnter { node_name, .. } => tracing::debug!("enter {node_name}"),
//!         GraphEvent::TransitionApplied { to, .. } => tracing::debug!("now in {to}"),
//!         _ => {}
//!     }
//! }
//! ```

use core::fmt;

use super::schedule::{
    OnBreakPoint, OnGraphPaused, OnGraphResumed, OnGraphStart, OnGraphStop, OnInterrupt,
    OnNodeEnter, OnNodeExit, OnTransitionApplied, OnTransitionDropped, ScheduleId,
};
use crate::instance::GraphInstanceId;
use crate::node::NodeId;

/// Why a node stopped being active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The node finished with success.
    Success,
    /// The node finished with failure.
    Failure,
    /// A higher-priority branch or an abort pre-empted the node.
    Interrupted,
    /// The whole graph was stopped.
    Stopped,
    /// A state machine transitioned away from the state.
    Transition,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitReason::Success => "success",
            ExitReason::Failure => "failure",
            ExitReason::Interrupted => "interrupted",
            ExitReason::Stopped => "stopped",
            ExitReason::Transition => "transition",
        };
        f.write_str(name)
    }
}

/// Unified event enum for all graph lifecycle hooks.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    // ─────────────────────────────────────────────────────────────────────────
    // Graph-Level Events
    // ─────────────────────────────────────────────────────────────────────────
    /// The graph started playing.
    GraphStart {
        /// Graph instance.
        graph: GraphInstanceId,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// The graph was stopped and reset.
    GraphStop {
        /// Graph instance.
        graph: GraphInstanceId,
    },
    /// The graph was paused.
    GraphPaused {
        /// Graph instance.
        graph: GraphInstanceId,
    },
    /// The graph resumed.
    GraphResumed {
        /// Graph instance.
        graph: GraphInstanceId,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Node Events
    // ─────────────────────────────────────────────────────────────────────────
    /// A node became active.
    NodeEnter {
        /// Graph instance.
        graph: GraphInstanceId,
        /// The node.
        node_id: NodeId,
        /// The node's name.
        node_name: String,
    },
    /// A node stopped being active.
    NodeExit {
        /// Graph instance.
        graph: GraphInstanceId,
        /// The node.
        node_id: NodeId,
        /// The node's name.
        node_name: String,
        /// Why it exited.
        reason: ExitReason,
    },
    /// A running branch was interrupted.
    Interrupt {
        /// Graph instance.
        graph: GraphInstanceId,
        /// The composite whose running child was pre-empted.
        interrupted: NodeId,
        /// The node that took over.
        by: NodeId,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transition Events
    // ─────────────────────────────────────────────────────────────────────────
    /// A state machine applied a transition.
    TransitionApplied {
        /// Graph instance.
        graph: GraphInstanceId,
        /// Previous state; `None` for the start transition.
        from: Option<NodeId>,
        /// New state.
        to: NodeId,
        /// Name of the link that requested it.
        link_name: String,
    },
    /// A transition request was discarded.
    TransitionDropped {
        /// Graph instance.
        graph: GraphInstanceId,
        /// State that issued the request.
        from: NodeId,
        /// Name of the link.
        link_name: String,
        /// Why it was dropped.
        reason: &'static str,
    },
    /// A state flagged as a break point was entered.
    BreakPoint {
        /// Graph instance.
        graph: GraphInstanceId,
        /// The state.
        node_id: NodeId,
    },
}

impl GraphEvent {
    /// Returns the schedule this event is dispatched on.
    #[must_use]
    pub fn schedule_id(&self) -> ScheduleId {
        match self {
            GraphEvent::GraphStart { .. } => ScheduleId::of::<OnGraphStart>(),
            GraphEvent::GraphStop { .. } => ScheduleId::of::<OnGraphStop>(),
            GraphEvent::GraphPaused { .. } => ScheduleId::of::<OnGraphPaused>(),
            GraphEvent::GraphResumed { .. } => ScheduleId::of::<OnGraphResumed>(),
            GraphEvent::NodeEnter { .. } => ScheduleId::of::<OnNodeEnter>(),
            GraphEvent::NodeExit { .. } => ScheduleId::of::<OnNodeExit>(),
            GraphEvent::Interrupt { .. } => ScheduleId::of::<OnInterrupt>(),
            GraphEvent::TransitionApplied { .. } => ScheduleId::of::<OnTransitionApplied>(),
            GraphEvent::TransitionDropped { .. } => ScheduleId::of::<OnTransitionDropped>(),
            GraphEvent::BreakPoint { .. } => ScheduleId::of::<OnBreakPoint>(),
        }
    }

    /// Returns the graph instance the event belongs to.
    #[must_use]
    pub fn graph(&self) -> &GraphInstanceId {
        match self {
            GraphEvent::GraphStart { graph, .. }
            | GraphEvent::GraphStop { graph }
            | GraphEvent::GraphPaused { graph }
            | GraphEvent::GraphResumed { graph }
            | GraphEvent::NodeEnter { graph, .. }
            | GraphEvent::NodeExit { graph, .. }
            | GraphEvent::Interrupt { graph, .. }
            | GraphEvent::TransitionApplied { graph, .. }
            | GraphEvent::TransitionDropped { graph, .. }
            | GraphEvent::BreakPoint { graph, .. } => graph,
        }
    }

    /// Returns the node the event is about, if any.
    ///
    /// Graph-level events return `None`.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            GraphEvent::GraphStart { .. }
            | GraphEvent::GraphStop { .. }
            | GraphEvent::GraphPaused { .. }
            | GraphEvent::GraphResumed { .. } => None,
            GraphEvent::NodeEnter { node_id, .. }
            | GraphEvent::NodeExit { node_id, .. }
            | GraphEvent::BreakPoint { node_id, .. } => Some(*node_id),
            GraphEvent::Interrupt { by, .. } => Some(*by),
            GraphEvent::TransitionApplied { to, .. } => Some(*to),
            GraphEvent::TransitionDropped { from, .. } => Some(*from),
        }
    }
}

impl fmt::Display for GraphEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphEvent::GraphStart { graph, node_count } => {
                write!(f, "GraphStart({graph}, nodes: {node_count})")
            }
            GraphEvent::GraphStop { graph } => write!(f, "GraphStop({graph})"),
            GraphEvent::GraphPaused { graph } => write!(f, "GraphPaused({graph})"),
            GraphEvent::GraphResumed { graph } => write!(f, "GraphResumed({graph})"),
            GraphEvent::NodeEnter {
                node_id, node_name, ..
            } => write!(f, "NodeEnter({node_name} @ {node_id})"),
            GraphEvent::NodeExit {
                node_id,
                node_name,
                reason,
                ..
            } => write!(f, "NodeExit({node_name} @ {node_id}, {reason})"),
            GraphEvent::Interrupt {
                interrupted, by, ..
            } => write!(f, "Interrupt({interrupted} by {by})"),
            GraphEvent::TransitionApplied {
                from,
                to,
                link_name,
                ..
            } => match from {
                Some(from) => write!(f, "TransitionApplied({from} -> {to} via '{link_name}')"),
                None => write!(f, "TransitionApplied(start -> {to})"),
            },
            GraphEvent::TransitionDropped {
                from,
                link_name,
                reason,
                ..
            } => write!(f, "TransitionDropped({from} via '{link_name}': {reason})"),
            GraphEvent::BreakPoint { node_id, .. } => write!(f, "BreakPoint({node_id})"),
        }
    }
}
