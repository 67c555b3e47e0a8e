// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node graph: ordered nodes plus the in-progress connection drag.

use crate::node::{NodeError, RoomNode, RoomNodeId};
use crate::room_type::RoomNodeType;
use egui::{Pos2, Rect};
use indexmap::IndexMap;

/// A connection line being stretched from a source node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionDrag {
    /// Node the line starts from
    pub from: RoomNodeId,
    /// Free end of the line (canvas space)
    pub line_position: Pos2,
}

/// A dungeon layout graph.
///
/// Nodes are kept in creation order, which is also draw order; the map gives
/// O(1) lookup by id. Every id in any node's outgoing list is a key of the
/// map once an edit operation returns.
#[derive(Debug, Clone)]
pub struct RoomNodeGraph {
    /// Graph name
    pub name: String,
    nodes: IndexMap<RoomNodeId, RoomNode>,
    connection_drag: Option<ConnectionDrag>,
}

impl RoomNodeGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connection_drag: None,
        }
    }

    /// Create a node with a fresh id and add it to the graph
    pub fn create_node(&mut self, rect: Rect, room_type: RoomNodeType) -> Result<RoomNodeId, GraphError> {
        let node = RoomNode::new(rect, room_type)?;
        self.add_node(node)
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: RoomNode) -> Result<RoomNodeId, GraphError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node and every connection pointing at it
    pub fn remove_node(&mut self, node_id: RoomNodeId) -> Option<RoomNode> {
        // shift_remove keeps creation order for the remaining nodes
        let removed = self.nodes.shift_remove(&node_id)?;

        for node in self.nodes.values_mut() {
            node.remove_connection(node_id);
        }

        if self.connection_drag.is_some_and(|drag| drag.from == node_id) {
            self.connection_drag = None;
        }

        Some(removed)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: RoomNodeId) -> Option<&RoomNode> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: RoomNodeId) -> Option<&mut RoomNode> {
        self.nodes.get_mut(&node_id)
    }

    /// Whether the graph contains a node
    pub fn contains(&self, node_id: RoomNodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &RoomNode> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut RoomNode> {
        self.nodes.values_mut()
    }

    /// Node IDs in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = RoomNodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All connections as `(source, target)` pairs
    pub fn connections(&self) -> impl Iterator<Item = (RoomNodeId, RoomNodeId)> + '_ {
        self.nodes
            .values()
            .flat_map(|node| node.child_ids().iter().map(move |child| (node.id(), *child)))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.nodes.values().map(|node| node.child_ids().len()).sum()
    }

    /// Nodes with an outgoing connection to `node_id`
    pub fn parents_of(&self, node_id: RoomNodeId) -> impl Iterator<Item = RoomNodeId> + '_ {
        self.nodes
            .values()
            .filter(move |node| node.is_connected_to(node_id))
            .map(RoomNode::id)
    }

    /// Topmost node under `point`.
    ///
    /// Later nodes draw on top, so the search runs newest first.
    pub fn node_at(&self, point: Pos2) -> Option<RoomNodeId> {
        self.nodes
            .values()
            .rev()
            .find(|node| node.hit_test(point))
            .map(RoomNode::id)
    }

    /// Start stretching a connection line from `source`
    pub fn begin_connection_drag(&mut self, source: RoomNodeId, start: Pos2) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::NodeNotFound(source));
        }
        self.connection_drag = Some(ConnectionDrag {
            from: source,
            line_position: start,
        });
        Ok(())
    }

    /// Move the free end of the connection line
    pub fn update_connection_drag(&mut self, point: Pos2) -> bool {
        match self.connection_drag.as_mut() {
            Some(drag) => {
                drag.line_position = point;
                true
            }
            None => false,
        }
    }

    /// Finish the connection drag on `target`.
    ///
    /// The drag state is cleared whatever the outcome. Returns `Ok(false)`
    /// when the connection already existed.
    pub fn commit_connection_drag(&mut self, target: RoomNodeId) -> Result<bool, GraphError> {
        let drag = self.connection_drag.take().ok_or(GraphError::NoConnectionDrag)?;

        if drag.from == target {
            return Err(GraphError::SelfLoop(target));
        }

        let target_node = self.nodes.get(&target).ok_or(GraphError::NodeNotFound(target))?;
        if target_node.is_placeholder() {
            return Err(GraphError::PlaceholderTarget(target));
        }

        let source = self
            .nodes
            .get_mut(&drag.from)
            .ok_or(GraphError::NodeNotFound(drag.from))?;
        Ok(source.add_connection(target))
    }

    /// Abandon the connection drag
    pub fn cancel_connection_drag(&mut self) {
        self.connection_drag = None;
    }

    /// The connection drag in progress, if any
    pub fn connection_drag(&self) -> Option<&ConnectionDrag> {
        self.connection_drag.as_ref()
    }

    /// Whether a connection line is being stretched
    pub fn is_connecting(&self) -> bool {
        self.connection_drag.is_some()
    }

    /// Check that no connection refers to a missing node
    pub fn validate(&self) -> Result<(), GraphError> {
        for (from, to) in self.connections() {
            if !self.nodes.contains_key(&to) {
                return Err(GraphError::DanglingReference { from, to });
            }
        }
        Ok(())
    }
}

impl Default for RoomNodeGraph {
    fn default() -> Self {
        Self::new("Room Node Graph")
    }
}

/// Error when editing a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node could not be created
    #[error(transparent)]
    Node(#[from] NodeError),

    /// A node with this id is already in the graph
    #[error("Duplicate node: {0}")]
    DuplicateNode(RoomNodeId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(RoomNodeId),

    /// Connection from a node to itself
    #[error("Self-loop not allowed on node {0}")]
    SelfLoop(RoomNodeId),

    /// Connection onto a node that still has the placeholder type
    #[error("Cannot connect to placeholder node {0}")]
    PlaceholderTarget(RoomNodeId),

    /// Commit without a drag in progress
    #[error("No connection drag in progress")]
    NoConnectionDrag,

    /// A connection refers to a node that is not in the graph
    #[error("Connection from {from} refers to missing node {to}")]
    DanglingReference {
        /// Source node
        from: RoomNodeId,
        /// Missing target
        to: RoomNodeId,
    },
}
