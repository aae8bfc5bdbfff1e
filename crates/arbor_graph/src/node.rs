//! Node identity and node kinds.
//!
//! Every node in a graph is addressed by a [`NodeId`]. Links between nodes
//! store ids, never references, so a node can be removed while other nodes
//! still point at it; such links are treated as unconnected.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::link::NodeLink;

/// Unique identifier for a node in a graph.
///
/// Ids are non-zero; the raw value `0` is reserved for "unconnected" in
/// serialized links and never names a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a node id from a raw value. Returns `None` for `0`.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Returns the raw id value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub(crate) fn from_non_zero(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    pub(crate) fn as_non_zero(self) -> NonZeroU32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Identifier of a parent-to-child edge, stable across reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(NonZeroU32);

impl BranchId {
    /// Creates a branch id from a raw value. Returns `None` for `0`.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Returns the raw id value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub(crate) fn from_non_zero(raw: NonZeroU32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch_{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reroute
// ─────────────────────────────────────────────────────────────────────────────

/// Which way a reroute node's connector points. Only used for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerouteDirection {
    /// Points left.
    Left,
    /// Points right.
    #[default]
    Right,
    /// Points up.
    Up,
    /// Points down.
    Down,
}

/// Pure indirection node with a single outgoing link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerouteNode {
    /// The outgoing link.
    pub link: NodeLink,
    /// Display direction hint.
    pub direction: RerouteDirection,
}

impl RerouteNode {
    /// Creates a reroute node pointing at `link`.
    #[must_use]
    pub fn new(link: NodeLink) -> Self {
        Self {
            link,
            direction: RerouteDirection::default(),
        }
    }

    /// Sets the display direction.
    #[must_use]
    pub fn with_direction(mut self, direction: RerouteDirection) -> Self {
        self.direction = direction;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphNode
// ─────────────────────────────────────────────────────────────────────────────

/// What a node is: a behaviour payload or a reroute.
#[derive(Debug)]
pub enum NodeKind<T> {
    /// A node that carries interpreter-specific behaviour.
    Behaviour(T),
    /// A pure indirection node.
    Reroute(RerouteNode),
}

/// A node stored in a [`NodeGraph`](crate::graph::NodeGraph).
#[derive(Debug)]
pub struct GraphNode<T> {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind<T>,
}

impl<T> GraphNode<T> {
    /// Returns the node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the node.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the node's kind.
    #[must_use]
    pub fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    /// Returns the node's kind mutably.
    pub fn kind_mut(&mut self) -> &mut NodeKind<T> {
        &mut self.kind
    }

    /// Returns the behaviour payload, if this is not a reroute.
    #[must_use]
    pub fn behaviour(&self) -> Option<&T> {
        match &self.kind {
            NodeKind::Behaviour(payload) => Some(payload),
            NodeKind::Reroute(_) => None,
        }
    }

    /// Returns the behaviour payload mutably.
    pub fn behaviour_mut(&mut self) -> Option<&mut T> {
        match &mut self.kind {
            NodeKind::Behaviour(payload) => Some(payload),
            NodeKind::Reroute(_) => None,
        }
    }

    /// Returns the reroute data, if this is a reroute.
    #[must_use]
    pub fn as_reroute(&self) -> Option<&RerouteNode> {
        match &self.kind {
            NodeKind::Reroute(reroute) => Some(reroute),
            NodeKind::Behaviour(_) => None,
        }
    }

    /// Returns whether this is a reroute.
    #[must_use]
    pub fn is_reroute(&self) -> bool {
        matches!(self.kind, NodeKind::Reroute(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_node_id() {
        assert!(NodeId::from_raw(0).is_none());
        assert_eq!(NodeId::from_raw(7).map(NodeId::get), Some(7));
    }

    #[test]
    fn node_id_display() {
        let id = NodeId::from_raw(3).unwrap();
        assert_eq!(id.to_string(), "node_3");
    }

    #[test]
    fn node_id_rejects_zero_when_deserializing() {
        assert!(serde_json::from_str::<NodeId>("0").is_err());
        assert_eq!(
            serde_json::from_str::<NodeId>("12").unwrap(),
            NodeId::from_raw(12).unwrap()
        );
    }

    #[test]
    fn graph_node_accessors() {
        let node = GraphNode {
            id: NodeId::from_raw(1).unwrap(),
            name: "idle".to_string(),
            kind: NodeKind::Behaviour(5_u8),
        };
        assert_eq!(node.behaviour(), Some(&5));
        assert!(node.as_reroute().is_none());
        assert!(!node.is_reroute());

        let reroute: GraphNode<u8> = GraphNode {
            id: NodeId::from_raw(2).unwrap(),
            name: "bend".to_string(),
            kind: NodeKind::Reroute(RerouteNode::new(NodeLink::UNCONNECTED)),
        };
        assert!(reroute.is_reroute());
        assert!(reroute.behaviour().is_none());
    }
}
