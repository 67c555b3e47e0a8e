// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room node graph editor for dungeon layout authoring.
//!
//! A dungeon layout is a directed graph of room nodes. Each node carries a
//! room type from a catalog (entrance, corridor, boss room, ...) and a list of
//! child rooms it connects to.
//!
//! ## Architecture
//!
//! - [`RoomNodeGraph`] owns nodes in creation order and the in-progress
//!   connection line
//! - [`GraphEditorController`] is the interaction state machine: node dragging,
//!   connection dragging, context menus, selection and undo
//! - [`EditorSession`] ties a graph to its asset file and catalog
//! - Rendering goes through the [`GraphRenderer`] trait; [`ui`] implements it
//!   for egui

pub mod room_type;
pub mod node;
pub mod graph;
pub mod config;
pub mod persistence;
pub mod history;
pub mod input;
pub mod session;
pub mod menu;
pub mod render;
pub mod controller;
pub mod ui;

pub use room_type::{RoomNodeType, RoomNodeTypeList, NONE_ROOM_TYPE};
pub use node::{RoomNode, RoomNodeId};
pub use graph::{ConnectionDrag, GraphError, RoomNodeGraph};
pub use config::EditorConfig;
pub use persistence::{load_graph, save_graph, GraphAsset};
pub use input::{PointerButton, PointerEvent, PointerEventKind};
pub use session::EditorSession;
pub use render::{GraphRenderer, NodeVisual};
pub use controller::{ControllerError, EditorMode, GraphEditorController};

pub use egui;
