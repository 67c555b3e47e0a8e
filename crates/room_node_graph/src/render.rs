// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer seam. The editing core hands geometry and state to a
//! [`GraphRenderer`] and never paints by itself.

use crate::node::RoomNodeId;
use crate::room_type::RoomNodeType;
use egui::{Pos2, Rect};

/// Everything a renderer needs to paint one node
#[derive(Debug, Clone, Copy)]
pub struct NodeVisual<'a> {
    /// Node id
    pub id: RoomNodeId,
    /// Bounding rectangle (canvas space)
    pub rect: Rect,
    /// Room type
    pub room_type: &'a RoomNodeType,
    /// Node is selected
    pub selected: bool,
    /// Node is being dragged
    pub dragging: bool,
}

/// Paints a room node graph
pub trait GraphRenderer {
    /// Paint a committed connection between two node anchors
    fn paint_connection(&mut self, from: Pos2, to: Pos2);

    /// Paint the line being dragged from a source anchor to the pointer
    fn paint_drag_line(&mut self, from: Pos2, to: Pos2);

    /// Paint a node
    fn paint_node(&mut self, node: &NodeVisual<'_>);
}
