// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room nodes: the vertices of a dungeon layout graph.

use crate::room_type::RoomNodeType;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a room node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomNodeId(pub Uuid);

impl RoomNodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomNodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A room in the layout graph.
///
/// Connections are stored as an adjacency list of outgoing edges on the
/// source node. The list never holds the node's own id and never holds the
/// same target twice.
#[derive(Debug, Clone)]
pub struct RoomNode {
    id: RoomNodeId,
    rect: Rect,
    room_type: RoomNodeType,
    child_ids: Vec<RoomNodeId>,
    dragging: bool,
    selected: bool,
}

impl RoomNode {
    /// Create a node with a fresh id
    pub fn new(rect: Rect, room_type: RoomNodeType) -> Result<Self, NodeError> {
        Self::with_id(RoomNodeId::new(), rect, room_type)
    }

    /// Create a node with a known id (used when loading assets)
    pub fn with_id(id: RoomNodeId, rect: Rect, room_type: RoomNodeType) -> Result<Self, NodeError> {
        let size = rect.size();
        if !rect.min.is_finite() || !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return Err(NodeError::MalformedGeometry {
                width: size.x,
                height: size.y,
            });
        }

        Ok(Self {
            id,
            rect,
            room_type,
            child_ids: Vec::new(),
            dragging: false,
            selected: false,
        })
    }

    /// Node id
    pub fn id(&self) -> RoomNodeId {
        self.id
    }

    /// Bounding rectangle in canvas space
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Top-left corner in canvas space
    pub fn position(&self) -> Pos2 {
        self.rect.min
    }

    /// Room type
    pub fn room_type(&self) -> &RoomNodeType {
        &self.room_type
    }

    /// Whether the node still has the placeholder type
    pub fn is_placeholder(&self) -> bool {
        self.room_type.is_none
    }

    pub(crate) fn set_room_type(&mut self, room_type: RoomNodeType) {
        self.room_type = room_type;
    }

    /// Outgoing connections in the order they were made
    pub fn child_ids(&self) -> &[RoomNodeId] {
        &self.child_ids
    }

    /// Whether this node has an outgoing connection to `target`
    pub fn is_connected_to(&self, target: RoomNodeId) -> bool {
        self.child_ids.contains(&target)
    }

    /// Add an outgoing connection.
    ///
    /// Returns `false` without changing anything when the target is this node
    /// or is already connected.
    pub fn add_connection(&mut self, target: RoomNodeId) -> bool {
        if target == self.id || self.child_ids.contains(&target) {
            return false;
        }
        self.child_ids.push(target);
        true
    }

    /// Remove an outgoing connection. Returns whether one was removed.
    pub fn remove_connection(&mut self, target: RoomNodeId) -> bool {
        let before = self.child_ids.len();
        self.child_ids.retain(|id| *id != target);
        self.child_ids.len() != before
    }

    /// Remove every outgoing connection
    pub fn clear_connections(&mut self) -> usize {
        let removed = self.child_ids.len();
        self.child_ids.clear();
        removed
    }

    /// Whether `point` lies inside the node
    pub fn hit_test(&self, point: Pos2) -> bool {
        self.rect.contains(point)
    }

    /// Start repositioning the node
    pub fn begin_drag(&mut self, point: Pos2) {
        tracing::trace!("Node {} drag started at {:?}", self.id, point);
        self.dragging = true;
    }

    /// Move the node by `delta` while a drag is active
    pub fn continue_drag(&mut self, delta: Vec2) -> bool {
        if !self.dragging || delta == Vec2::ZERO {
            return false;
        }
        self.rect = self.rect.translate(delta);
        true
    }

    /// Stop repositioning the node
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Whether a drag is active
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the node is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// Error when creating a node
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Rectangle with non-positive or non-finite extent
    #[error("Malformed node geometry: {width}x{height}")]
    MalformedGeometry {
        /// Requested width
        width: f32,
        /// Requested height
        height: f32,
    },
}
