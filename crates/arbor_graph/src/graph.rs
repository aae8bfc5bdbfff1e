//! Node graph store.
//!
//! [`NodeGraph`] owns every node of one graph, keyed by [`NodeId`]. It is
//! generic over the behaviour payload so the behaviour tree and state machine
//! interpreters share the same store, reroute handling and validation.
//!
//! # Example
//!
//! ```
//! use arbor_graph::graph::NodeGraph;
//! use arbor_graph::link::NodeLink;
//!
//! let mut graph: NodeGraph<&str> = NodeGraph::new();
//! let idle = graph.add_node("idle", "payload");
//! let bend = graph.add_reroute("bend", NodeLink::to(idle));
//!
//! assert_eq!(graph.node_count(), 2);
//! assert!(graph.get_node(bend).is_some_and(|node| node.is_reroute()));
//! ```

use core::num::NonZeroU32;

use hashbrown::HashMap;

use crate::error::{GraphError, ValidationError};
use crate::link::{NodeLink, NodeLinks};
use crate::node::{BranchId, GraphNode, NodeId, NodeKind, RerouteNode};
use crate::resolver::{self, Resolution};

// ─────────────────────────────────────────────────────────────────────────────
// IdAllocator
// ─────────────────────────────────────────────────────────────────────────────

/// Monotonic allocator for node and branch ids.
///
/// Ids are never handed out twice during the allocator's lifetime, even after
/// the node that held them is removed. Once the `u32` space is used up the
/// allocator yields `None` forever.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_node: Option<NonZeroU32>,
    next_branch: Option<NonZeroU32>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_node: Some(NonZeroU32::MIN),
            next_branch: Some(NonZeroU32::MIN),
        }
    }
}

impl IdAllocator {
    /// Creates an allocator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next node id, or `None` once node ids are exhausted.
    pub fn next_node(&mut self) -> Option<NodeId> {
        let id = self.next_node?;
        self.next_node = id.checked_add(1);
        Some(NodeId::from_non_zero(id))
    }

    /// Hands out the next branch id, or `None` once branch ids are exhausted.
    pub fn next_branch(&mut self) -> Option<BranchId> {
        let id = self.next_branch?;
        self.next_branch = id.checked_add(1);
        Some(BranchId::from_non_zero(id))
    }

    /// Ensures future node ids are greater than `id`.
    ///
    /// Used when nodes are inserted with ids assigned elsewhere, e.g. after
    /// loading a saved graph.
    pub fn reserve_past(&mut self, id: NodeId) {
        if self.next_node.is_some_and(|next| id.get() >= next.get()) {
            self.next_node = id.as_non_zero().checked_add(1);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeGraph
// ─────────────────────────────────────────────────────────────────────────────

/// Arena of nodes keyed by id.
#[derive(Debug)]
pub struct NodeGraph<T> {
    nodes: HashMap<NodeId, GraphNode<T>>,
    ids: IdAllocator,
}

impl<T> Default for NodeGraph<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            ids: IdAllocator::new(),
        }
    }
}

impl<T> NodeGraph<T> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a behaviour node and returns its fresh id.
    ///
    /// # Panics
    ///
    /// Panics if node ids are exhausted. Use
    /// [`try_add_node`](Self::try_add_node) to handle that case.
    pub fn add_node(&mut self, name: impl Into<String>, payload: T) -> NodeId {
        match self.try_add_node(name, payload) {
            Ok(id) => id,
            Err(err) => panic!("add_node: {err}"),
        }
    }

    /// Adds a reroute node pointing at `link` and returns its fresh id.
    ///
    /// # Panics
    ///
    /// Panics if node ids are exhausted. Use
    /// [`try_add_reroute`](Self::try_add_reroute) to handle that case.
    pub fn add_reroute(&mut self, name: impl Into<String>, link: NodeLink) -> NodeId {
        match self.try_add_reroute(name, link) {
            Ok(id) => id,
            Err(err) => panic!("add_reroute: {err}"),
        }
    }

    /// Adds a behaviour node and returns its fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::IdSpaceExhausted`] if no node id is left. The
    /// graph is left unchanged.
    pub fn try_add_node(
        &mut self,
        name: impl Into<String>,
        payload: T,
    ) -> Result<NodeId, GraphError> {
        self.push(name.into(), NodeKind::Behaviour(payload))
    }

    /// Adds a reroute node pointing at `link` and returns its fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::IdSpaceExhausted`] if no node id is left. The
    /// graph is left unchanged.
    pub fn try_add_reroute(
        &mut self,
        name: impl Into<String>,
        link: NodeLink,
    ) -> Result<NodeId, GraphError> {
        self.push(name.into(), NodeKind::Reroute(RerouteNode::new(link)))
    }

    fn push(&mut self, name: String, kind: NodeKind<T>) -> Result<NodeId, GraphError> {
        let Some(id) = self.ids.next_node() else {
            tracing::error!(name = %name, "node id space exhausted, node not added");
            return Err(GraphError::IdSpaceExhausted);
        };
        tracing::trace!(node = %id, name = %name, "node added");
        self.nodes.insert(id, GraphNode { id, name, kind });
        Ok(id)
    }

    /// Inserts a node under an id assigned elsewhere.
    ///
    /// The allocator is advanced past `id` so later ids stay unique.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNodeId`] if `id` is taken.
    pub fn insert_with_id(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        kind: NodeKind<T>,
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        self.ids.reserve_past(id);
        self.nodes.insert(
            id,
            GraphNode {
                id,
                name: name.into(),
                kind,
            },
        );
        Ok(())
    }

    /// Removes a node.
    ///
    /// Links elsewhere that point at the node are left as they are and
    /// behave as unconnected from now on.
    pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode<T>> {
        let removed = self.nodes.remove(&id);
        if removed.is_some() {
            tracing::trace!(node = %id, "node removed");
        }
        removed
    }

    /// Returns the node with this id.
    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<&GraphNode<T>> {
        self.nodes.get(&id)
    }

    /// Returns the node with this id mutably.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode<T>> {
        self.nodes.get_mut(&id)
    }

    /// Returns the behaviour payload of a node.
    #[must_use]
    pub fn behaviour(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(&id).and_then(GraphNode::behaviour)
    }

    /// Returns the behaviour payload of a node mutably.
    pub fn behaviour_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(&id).and_then(GraphNode::behaviour_mut)
    }

    /// Returns the reroute data of a node.
    #[must_use]
    pub fn reroute(&self, id: NodeId) -> Option<&RerouteNode> {
        self.nodes.get(&id).and_then(GraphNode::as_reroute)
    }

    /// Returns whether a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns all node ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterates over all nodes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &GraphNode<T>> {
        self.nodes.values()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hands out a fresh branch id for a parent-to-child edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::IdSpaceExhausted`] if no branch id is left.
    pub fn allocate_branch_id(&mut self) -> Result<BranchId, GraphError> {
        self.ids.next_branch().ok_or(GraphError::IdSpaceExhausted)
    }

    /// Returns the id allocator.
    #[must_use]
    pub fn allocator(&self) -> &IdAllocator {
        &self.ids
    }

    /// Returns the id allocator mutably.
    pub fn allocator_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Points reroute `from` at `to`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NodeNotFound`] if `from` does not exist
    /// - [`GraphError::NotAReroute`] if `from` is not a reroute
    /// - [`GraphError::WouldCreateLoop`] if the new link closes a reroute cycle
    pub fn connect_reroute(&mut self, from: NodeId, to: NodeLink) -> Result<(), GraphError> {
        let node = self.nodes.get(&from).ok_or(GraphError::NodeNotFound(from))?;
        if !node.is_reroute() {
            return Err(GraphError::NotAReroute(from));
        }
        if let Some(target) = to.target()
            && resolver::check_loop(self, from, target)
        {
            return Err(GraphError::WouldCreateLoop { from, to: target });
        }
        if let Some(GraphNode {
            kind: NodeKind::Reroute(reroute),
            ..
        }) = self.nodes.get_mut(&from)
        {
            reroute.link = to;
        }
        Ok(())
    }
}

impl<T: NodeLinks> NodeGraph<T> {
    /// Checks every link in the graph.
    ///
    /// Reports reroute cycles, links to removed nodes and unconnected links.
    /// Errors are ordered by node id.
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for id in self.ids() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let links = match &node.kind {
                NodeKind::Behaviour(payload) => payload.links(),
                NodeKind::Reroute(reroute) => vec![reroute.link],
            };
            for link in links {
                match link.target() {
                    None => errors.push(ValidationError::UnconnectedLink { node: id }),
                    Some(target) if !self.contains(target) => {
                        errors.push(ValidationError::DanglingLink { node: id, target });
                    }
                    Some(_) => {}
                }
            }

            if node.is_reroute()
                && let (Resolution::Cycle(repeat), _) = resolver::resolve_path(self, NodeLink::to(id))
                && repeat == id
            {
                errors.push(ValidationError::RerouteCycle { node: id });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
