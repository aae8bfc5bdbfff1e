//! Tests for `NodeGraph::validate()`.

mod test_utils;

use arbor_graph::error::ValidationError;
use arbor_graph::graph::NodeGraph;
use arbor_graph::link::NodeLink;
use test_utils::{Linked, force_reroute};

#[test]
fn empty_graph_is_valid() {
    let graph: NodeGraph<Linked> = NodeGraph::new();
    assert!(graph.validate().is_ok());
}

#[test]
fn fully_connected_graph_is_valid() {
    let mut graph = NodeGraph::new();
    let leaf = graph.add_node("leaf", Linked::default());
    let bend = graph.add_reroute("bend", NodeLink::to(leaf));
    graph.add_node("root", Linked::to(&[bend]));

    assert!(graph.validate().is_ok());
}

#[test]
fn removed_target_reports_dangling_link() {
    let mut graph = NodeGraph::new();
    let leaf = graph.add_node("leaf", Linked::default());
    let root = graph.add_node("root", Linked::to(&[leaf]));
    graph.remove_node(leaf);

    let errors = graph.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::DanglingLink {
            node: root,
            target: leaf
        }]
    );
}

#[test]
fn unconnected_links_are_reported() {
    let mut graph = NodeGraph::new();
    let root = graph.add_node(
        "root",
        Linked {
            links: vec![NodeLink::UNCONNECTED],
        },
    );
    let bend = graph.add_reroute("bend", NodeLink::UNCONNECTED);

    let errors = graph.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![
            ValidationError::UnconnectedLink { node: root },
            ValidationError::UnconnectedLink { node: bend },
        ]
    );
}

#[test]
fn reroute_cycle_reports_every_member() {
    let mut graph = NodeGraph::new();
    let a = graph.add_reroute("a", NodeLink::UNCONNECTED);
    let b = graph.add_reroute("b", NodeLink::to(a));
    force_reroute(&mut graph, a, NodeLink::to(b));
    // Feeds into the cycle without being on it.
    let entry = graph.add_reroute("entry", NodeLink::to(a));

    let errors = graph.validate().unwrap_err();
    assert!(errors.contains(&ValidationError::RerouteCycle { node: a }));
    assert!(errors.contains(&ValidationError::RerouteCycle { node: b }));
    assert!(!errors.contains(&ValidationError::RerouteCycle { node: entry }));
}

#[test]
fn validation_error_display() {
    let mut graph = NodeGraph::new();
    let leaf = graph.add_node("leaf", Linked::default());
    graph.add_node("root", Linked::to(&[leaf]));
    graph.remove_node(leaf);

    let errors = graph.validate().unwrap_err();
    assert_eq!(errors[0].to_string(), "node node_2 links to missing node node_1");
}
