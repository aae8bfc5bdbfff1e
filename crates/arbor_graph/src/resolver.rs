//! Link resolution through reroute chains.
//!
//! Reroute nodes are pure indirection, so every consumer of a link resolves
//! it before use. Resolution never mutates the graph and always terminates:
//! a reroute visited twice ends the walk with [`Resolution::Cycle`].

use hashbrown::HashSet;

use crate::graph::NodeGraph;
use crate::link::NodeLink;
use crate::node::NodeId;

/// Outcome of resolving a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The link leads to this non-reroute node.
    Resolved(NodeId),
    /// The link, or a reroute along the way, is unconnected.
    Unconnected,
    /// The chain names a node that does not exist.
    Dangling(NodeId),
    /// The chain revisits this reroute.
    Cycle(NodeId),
}

impl Resolution {
    /// Returns the resolved node id, or `None` for every other outcome.
    #[must_use]
    pub fn target(self) -> Option<NodeId> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::Unconnected | Resolution::Dangling(_) | Resolution::Cycle(_) => None,
        }
    }
}

/// Resolves `link` to the node it ultimately points at.
///
/// Cycles are logged at `warn` level.
#[must_use]
pub fn resolve<T>(graph: &NodeGraph<T>, link: NodeLink) -> Resolution {
    let (resolution, hops) = resolve_path(graph, link);
    if let Resolution::Cycle(repeat) = resolution {
        tracing::warn!(
            start = %link,
            reroute = %repeat,
            hops = hops.len(),
            "reroute cycle, link treated as unresolved"
        );
    }
    resolution
}

/// Resolves `link` and returns the reroutes walked through, in order.
///
/// The walk visits each reroute at most once, so the returned path never
/// holds more than `graph.node_count()` ids.
#[must_use]
pub fn resolve_path<T>(graph: &NodeGraph<T>, link: NodeLink) -> (Resolution, Vec<NodeId>) {
    let mut visited = HashSet::new();
    let mut hops = Vec::new();
    let mut current = link;

    for _ in 0..=graph.node_count() {
        let Some(target) = current.target() else {
            return (Resolution::Unconnected, hops);
        };
        let Some(node) = graph.get_node(target) else {
            return (Resolution::Dangling(target), hops);
        };
        let Some(reroute) = node.as_reroute() else {
            return (Resolution::Resolved(target), hops);
        };
        if !visited.insert(target) {
            return (Resolution::Cycle(target), hops);
        }
        hops.push(target);
        current = reroute.link;
    }

    // Only reachable if the node count changed mid-walk.
    let last = hops.last().copied();
    (last.map_or(Resolution::Unconnected, Resolution::Cycle), hops)
}

/// Returns whether pointing reroute `from` at `to` would close a cycle.
///
/// Follows the reroute chain starting at `to`; reaching `from` means the new
/// link would loop back onto itself. Pre-existing cycles that do not pass
/// through `from` are not reported.
#[must_use]
pub fn check_loop<T>(graph: &NodeGraph<T>, from: NodeId, to: NodeId) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(to);

    while let Some(id) = current {
        if id == from {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = graph.reroute(id).and_then(|reroute| reroute.link.target());
    }
    false
}
