//! Integration tests for reroute resolution.
//!
//! Covers chain walking, dangling targets and the termination bound on
//! arbitrary reroute topologies.

mod test_utils;

use arbor_graph::graph::NodeGraph;
use arbor_graph::link::NodeLink;
use arbor_graph::node::NodeId;
use arbor_graph::resolver::{Resolution, check_loop, resolve, resolve_path};
use proptest::prelude::*;
use test_utils::{Linked, force_reroute, reroute_chain};

#[test]
fn long_chain_resolves_to_end() {
    let mut graph = NodeGraph::new();
    let end = graph.add_node("end", Linked::default());
    let head = reroute_chain(&mut graph, 50, NodeLink::to(end));

    let (resolution, hops) = resolve_path(&graph, head);
    assert_eq!(resolution, Resolution::Resolved(end));
    assert_eq!(hops.len(), 50);
}

#[test]
fn removing_middle_of_chain_makes_it_dangling() {
    let mut graph = NodeGraph::new();
    let end = graph.add_node("end", Linked::default());
    let middle = graph.add_reroute("middle", NodeLink::to(end));
    let head = graph.add_reroute("head", NodeLink::to(middle));

    graph.remove_node(middle);

    assert_eq!(resolve(&graph, NodeLink::to(head)), Resolution::Dangling(middle));
}

#[test]
fn two_reroute_cycle_terminates() {
    let mut graph = NodeGraph::new();
    let a = graph.add_reroute("a", NodeLink::UNCONNECTED);
    let b = graph.add_reroute("b", NodeLink::to(a));
    force_reroute(&mut graph, a, NodeLink::to(b));

    let (resolution, hops) = resolve_path(&graph, NodeLink::to(a));
    assert_eq!(resolution, Resolution::Cycle(a));
    assert_eq!(hops, vec![a, b]);
}

#[test]
fn entering_cycle_from_outside_reports_first_repeat() {
    let mut graph = NodeGraph::new();
    let a = graph.add_reroute("a", NodeLink::UNCONNECTED);
    let b = graph.add_reroute("b", NodeLink::to(a));
    force_reroute(&mut graph, a, NodeLink::to(b));
    let entry = graph.add_reroute("entry", NodeLink::to(a));

    assert_eq!(resolve(&graph, NodeLink::to(entry)), Resolution::Cycle(a));
}

#[test]
fn connect_reroute_refuses_to_close_chain() {
    let mut graph = NodeGraph::new();
    let end = graph.add_node("end", Linked::default());
    let tail = graph.add_reroute("tail", NodeLink::to(end));
    let head = graph.add_reroute("head", NodeLink::to(tail));

    assert!(check_loop(&graph, tail, head));
    assert!(graph.connect_reroute(tail, NodeLink::to(head)).is_err());
    assert!(graph.connect_reroute(tail, NodeLink::UNCONNECTED).is_ok());
    assert_eq!(resolve(&graph, NodeLink::to(head)), Resolution::Unconnected);
}

proptest! {
    /// Random reroute wiring, including cycles and dangling ids, always
    /// resolves within `node_count` hops.
    #[test]
    fn resolution_is_bounded(
        plain in 0usize..4,
        wiring in prop::collection::vec(0u32..24, 1..20),
        start in 0u32..24,
    ) {
        let mut graph = NodeGraph::new();
        for i in 0..plain {
            graph.add_node(format!("n{i}"), Linked::default());
        }
        let reroutes: Vec<NodeId> = wiring
            .iter()
            .enumerate()
            .map(|(i, _)| graph.add_reroute(format!("r{i}"), NodeLink::UNCONNECTED))
            .collect();
        for (reroute, raw) in reroutes.iter().zip(&wiring) {
            force_reroute(&mut graph, *reroute, NodeLink::from_raw(*raw));
        }

        let (resolution, hops) = resolve_path(&graph, NodeLink::from_raw(start));

        prop_assert!(hops.len() <= graph.node_count());
        if let Resolution::Resolved(id) = resolution {
            prop_assert!(graph.get_node(id).is_some_and(|node| !node.is_reroute()));
        }
        if let Resolution::Dangling(id) = resolution {
            prop_assert!(!graph.contains(id));
        }
    }

    /// Resolution is pure: resolving twice gives the same answer.
    #[test]
    fn resolution_is_deterministic(wiring in prop::collection::vec(0u32..12, 1..10)) {
        let mut graph = NodeGraph::new();
        let reroutes: Vec<NodeId> = wiring
            .iter()
            .enumerate()
            .map(|(i, _)| graph.add_reroute(format!("r{i}"), NodeLink::UNCONNECTED))
            .collect();
        for (reroute, raw) in reroutes.iter().zip(&wiring) {
            force_reroute(&mut graph, *reroute, NodeLink::from_raw(*raw));
        }

        for id in graph.ids() {
            let first = resolve_path(&graph, NodeLink::to(id));
            let second = resolve_path(&graph, NodeLink::to(id));
            prop_assert_eq!(first, second);
        }
    }
}
