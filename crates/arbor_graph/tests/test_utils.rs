//! Shared test utilities for `arbor_graph` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities — not all items used in every test binary"
)]

use arbor_graph::graph::NodeGraph;
use arbor_graph::link::{NodeLink, NodeLinks};
use arbor_graph::node::{GraphNode, NodeId, NodeKind};

/// Minimal payload with an arbitrary number of outgoing links.
#[derive(Debug, Default, Clone)]
pub struct Linked {
    pub links: Vec<NodeLink>,
}

impl Linked {
    pub fn to(targets: &[NodeId]) -> Self {
        Self {
            links: targets.iter().copied().map(NodeLink::to).collect(),
        }
    }
}

impl NodeLinks for Linked {
    fn links(&self) -> Vec<NodeLink> {
        self.links.clone()
    }
}

/// Points an existing reroute at `target`, bypassing loop checks.
pub fn force_reroute(graph: &mut NodeGraph<Linked>, reroute: NodeId, target: NodeLink) {
    if let Some(NodeKind::Reroute(node)) = graph.get_node_mut(reroute).map(GraphNode::kind_mut) {
        node.link = target;
    }
}

/// Builds a chain of `len` reroutes ending at `end` and returns the head.
pub fn reroute_chain(graph: &mut NodeGraph<Linked>, len: usize, end: NodeLink) -> NodeLink {
    let mut link = end;
    for i in 0..len {
        let id = graph.add_reroute(format!("r{i}"), link);
        link = NodeLink::to(id);
    }
    link
}
