//! Links between nodes.
//!
//! A [`NodeLink`] is an id reference that may be unconnected. Links are
//! serialized as their raw id with `0` meaning unconnected, which is the
//! representation authoring tools exchange.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::node::{BranchId, NodeId};

/// A reference from one node to another by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct NodeLink {
    target: Option<NodeId>,
}

impl NodeLink {
    /// A link that points nowhere.
    pub const UNCONNECTED: Self = Self { target: None };

    /// Creates a link to `target`.
    #[must_use]
    pub fn to(target: NodeId) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// Creates a link from a raw id, `0` meaning unconnected.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self {
            target: NodeId::from_raw(raw),
        }
    }

    /// Returns the target id, if connected.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Returns the raw target id, `0` when unconnected.
    #[must_use]
    pub fn raw(&self) -> u32 {
        self.target.map_or(0, NodeId::get)
    }

    /// Returns whether the link names a target.
    ///
    /// A connected link may still be dangling if its target was removed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    /// Points the link at `target`.
    pub fn connect(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    /// Clears the link.
    pub fn disconnect(&mut self) {
        self.target = None;
    }
}

impl From<NodeId> for NodeLink {
    fn from(id: NodeId) -> Self {
        Self::to(id)
    }
}

impl From<Option<NodeId>> for NodeLink {
    fn from(target: Option<NodeId>) -> Self {
        Self { target }
    }
}

impl From<u32> for NodeLink {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<NodeLink> for u32 {
    fn from(link: NodeLink) -> Self {
        link.raw()
    }
}

impl fmt::Display for NodeLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(id) => write!(f, "-> {id}"),
            None => f.write_str("-> (unconnected)"),
        }
    }
}

/// A child edge of a parent node.
///
/// The branch id identifies the edge independently of its position among
/// the parent's children, so children can be reordered or removed without
/// losing track of which one is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkSlot {
    /// Stable edge identity.
    pub branch_id: BranchId,
    /// The child this edge points at.
    pub link: NodeLink,
    /// Ordering key among siblings; smaller runs first.
    pub sort_key: i32,
}

impl NodeLinkSlot {
    /// Creates a slot.
    #[must_use]
    pub fn new(branch_id: BranchId, link: NodeLink, sort_key: i32) -> Self {
        Self {
            branch_id,
            link,
            sort_key,
        }
    }
}

/// Payloads that hold outgoing links.
///
/// [`NodeGraph::validate`](crate::graph::NodeGraph::validate) uses this to
/// report dangling and unconnected links.
pub trait NodeLinks {
    /// Returns every outgoing link of the payload.
    fn links(&self) -> Vec<NodeLink>;
}
