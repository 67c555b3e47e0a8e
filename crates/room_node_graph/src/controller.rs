// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive graph editing.
//!
//! [`GraphEditorController`] turns raw pointer events into edits of the
//! session's [`RoomNodeGraph`]:
//! - primary drag on a node moves it
//! - secondary drag from a node stretches a connection line, committed when
//!   released over another configured node
//! - secondary click on empty canvas opens the creation menu
//! - secondary click on a node opens the node menu
//!
//! Events are processed one at a time to completion. The controller never
//! paints; it raises a redraw flag and paints through a [`GraphRenderer`] on
//! request.

use crate::config::EditorConfig;
use crate::graph::{GraphError, RoomNodeGraph};
use crate::history::{GraphHistory, GraphSnapshot, HistoryError};
use crate::input::{PointerButton, PointerEvent, PointerEventKind};
use crate::menu::{ActionContext, ActionScope, ActionTable, ContextMenu, MenuItem, MenuTarget};
use crate::node::RoomNodeId;
use crate::render::{GraphRenderer, NodeVisual};
use crate::room_type::RoomNodeTypeList;
use crate::session::{EditorSession, SessionError};
use egui::{Pos2, Rect};

/// Pointer travel, in points, below which a secondary press still counts as a click
pub const CLICK_TRAVEL: f32 = 4.0;

/// Action name: create a room node at the menu position
pub const ACTION_CREATE_ROOM_NODE: &str = "create_room_node";
/// Action name: delete the menu's node
pub const ACTION_DELETE_ROOM_NODE: &str = "delete_room_node";
/// Action name: remove every connection of the menu's node
pub const ACTION_REMOVE_ROOM_NODE_LINKS: &str = "remove_room_node_links";
/// Action name: assign a room type to the menu's node
pub const ACTION_ASSIGN_ROOM_TYPE: &str = "assign_room_type";

/// Editor interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Nothing in progress
    #[default]
    Idle,
    /// A node is being repositioned
    NodeDragging {
        /// Node being moved
        node: RoomNodeId,
        /// Whether the node has moved since the press
        moved: bool,
    },
    /// A connection line is being stretched
    ConnectionDragging {
        /// Node the line starts from
        source: RoomNodeId,
        /// Whether the pointer has travelled past [`CLICK_TRAVEL`] since the press
        moved: bool,
    },
}

/// Drives a room node graph from pointer input
#[derive(Debug)]
pub struct GraphEditorController {
    session: EditorSession,
    config: EditorConfig,
    mode: EditorMode,
    current_node: Option<RoomNodeId>,
    context_menu: Option<ContextMenu>,
    actions: ActionTable,
    drag_snapshot: Option<GraphSnapshot>,
    press_position: Option<Pos2>,
    redraw_requested: bool,
}

impl GraphEditorController {
    /// Take ownership of an editing session
    pub fn new(mut session: EditorSession, config: EditorConfig) -> Self {
        session.history = GraphHistory::with_max_depth(config.history_depth);

        Self {
            session,
            config,
            mode: EditorMode::Idle,
            current_node: None,
            context_menu: None,
            actions: Self::build_action_table(),
            drag_snapshot: None,
            press_position: None,
            redraw_requested: true,
        }
    }

    fn build_action_table() -> ActionTable {
        let mut table = ActionTable::new();
        table.register(
            ACTION_CREATE_ROOM_NODE,
            "Create Room Node",
            ActionScope::Canvas,
            |ctl, ctx| ctl.create_room_node(ctx.position).map(|_| ()),
        );
        table.register(
            ACTION_DELETE_ROOM_NODE,
            "Delete Room Node",
            ActionScope::Node,
            |ctl, ctx| ctl.delete_room_node(menu_node(ctx)?),
        );
        table.register(
            ACTION_REMOVE_ROOM_NODE_LINKS,
            "Remove Room Node Links",
            ActionScope::Node,
            |ctl, ctx| ctl.remove_room_node_links(menu_node(ctx)?).map(|_| ()),
        );
        table.register(
            ACTION_ASSIGN_ROOM_TYPE,
            "Set Room Type",
            ActionScope::NodePerRoomType,
            |ctl, ctx| {
                let node = menu_node(ctx)?;
                let room_type = ctx
                    .argument
                    .as_deref()
                    .ok_or(ControllerError::MissingActionArgument(ACTION_ASSIGN_ROOM_TYPE))?;
                ctl.assign_room_type(node, room_type)
            },
        );
        table
    }

    /// Hand the session back, dropping any drag in progress
    pub fn end_session(mut self) -> EditorSession {
        self.reset_interaction();
        self.session
    }

    /// The session being edited
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// The graph being edited
    pub fn graph(&self) -> &RoomNodeGraph {
        &self.session.graph
    }

    /// Editor configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current interaction state
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Registered menu actions
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Node under the pointer at the last event (or the node being dragged)
    pub fn current_node(&self) -> Option<RoomNodeId> {
        self.current_node
    }

    /// Open context menu, if any
    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Return and clear the redraw flag
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    // === Event dispatch ===

    /// Process one pointer event
    pub fn handle_event(&mut self, event: &PointerEvent) {
        // Keep the dragged node as the subject even when the pointer outruns it
        if !matches!(self.mode, EditorMode::NodeDragging { .. }) {
            self.current_node = self.session.graph.node_at(event.position);
        }

        match self.current_node {
            Some(node) if !self.session.graph.is_connecting() => self.process_node_event(node, event),
            _ => self.process_graph_event(event),
        }
    }

    fn process_node_event(&mut self, node_id: RoomNodeId, event: &PointerEvent) {
        match (event.kind, event.button) {
            (PointerEventKind::Down, PointerButton::Primary) => {
                self.close_context_menu();
                if self.mode == EditorMode::Idle {
                    self.begin_node_drag(node_id, event.position);
                }
            }
            (PointerEventKind::Drag, PointerButton::Primary) => {
                let EditorMode::NodeDragging { node, .. } = self.mode else {
                    return;
                };
                let moved = self
                    .session
                    .graph
                    .node_mut(node)
                    .is_some_and(|subject| subject.continue_drag(event.delta));
                if moved {
                    self.mode = EditorMode::NodeDragging { node, moved: true };
                    self.redraw_requested = true;
                }
            }
            (PointerEventKind::Up, PointerButton::Primary) => self.end_node_drag(),
            (PointerEventKind::Down, PointerButton::Secondary) => {
                self.close_context_menu();
                if self.mode == EditorMode::Idle {
                    self.begin_connection_drag(node_id, event.position);
                }
            }
            _ => {}
        }
    }

    fn process_graph_event(&mut self, event: &PointerEvent) {
        let connecting = self.session.graph.is_connecting();

        match (event.kind, event.button) {
            (PointerEventKind::Down, PointerButton::Primary) => {
                self.close_context_menu();
                if !connecting {
                    self.clear_selection();
                }
            }
            (PointerEventKind::Down, PointerButton::Secondary) => {
                if !connecting {
                    self.open_canvas_menu(event.position);
                }
            }
            (PointerEventKind::Drag, PointerButton::Secondary) => {
                if self.session.graph.update_connection_drag(event.position) {
                    let travelled = self
                        .press_position
                        .is_some_and(|press| press.distance(event.position) > CLICK_TRAVEL);
                    if let EditorMode::ConnectionDragging { moved, .. } = &mut self.mode {
                        *moved |= travelled;
                    }
                    self.redraw_requested = true;
                }
            }
            (PointerEventKind::Up, PointerButton::Secondary) => {
                if connecting {
                    self.finish_connection_drag(event.position);
                }
            }
            (PointerEventKind::Up, PointerButton::Primary) => {
                // A node drag whose subject vanished mid-drag
                if matches!(self.mode, EditorMode::NodeDragging { .. }) {
                    self.end_node_drag();
                }
            }
            _ => {}
        }
    }

    // === Node dragging ===

    fn begin_node_drag(&mut self, node_id: RoomNodeId, point: Pos2) {
        self.select_node(node_id);

        match GraphSnapshot::capture("Move Room Node", &self.session.graph) {
            Ok(snapshot) => self.drag_snapshot = Some(snapshot),
            Err(e) => tracing::warn!("Could not record node move for undo: {e}"),
        }

        if let Some(node) = self.session.graph.node_mut(node_id) {
            node.begin_drag(point);
            self.mode = EditorMode::NodeDragging { node: node_id, moved: false };
            tracing::debug!("Dragging node {node_id}");
        }
    }

    fn end_node_drag(&mut self) {
        let EditorMode::NodeDragging { node, moved } = self.mode else {
            return;
        };

        if let Some(subject) = self.session.graph.node_mut(node) {
            subject.end_drag();
        }

        let snapshot = self.drag_snapshot.take();
        if moved {
            if let Some(snapshot) = snapshot {
                self.session.history.push(snapshot);
            }
            self.session.mark_dirty();
        }

        self.mode = EditorMode::Idle;
        self.redraw_requested = true;
        tracing::debug!("Node drag finished (moved: {moved})");
    }

    // === Connection dragging ===

    fn begin_connection_drag(&mut self, source: RoomNodeId, point: Pos2) {
        match self.session.graph.begin_connection_drag(source, point) {
            Ok(()) => {
                self.mode = EditorMode::ConnectionDragging { source, moved: false };
                self.press_position = Some(point);
                self.redraw_requested = true;
                tracing::debug!("Connection drag started from {source}");
            }
            Err(e) => tracing::debug!("Connection drag rejected: {e}"),
        }
    }

    fn finish_connection_drag(&mut self, point: Pos2) {
        let moved = matches!(self.mode, EditorMode::ConnectionDragging { moved: true, .. });
        let Some(source) = self.session.graph.connection_drag().map(|drag| drag.from) else {
            return;
        };

        match self.session.graph.node_at(point) {
            Some(target) if target != source => self.commit_connection(target),
            Some(_) => {
                self.session.graph.cancel_connection_drag();
                if !moved {
                    self.open_node_menu(source, point);
                }
            }
            None => {
                self.session.graph.cancel_connection_drag();
                tracing::debug!("Connection drag from {source} released over empty canvas");
            }
        }

        self.press_position = None;
        self.mode = EditorMode::Idle;
        self.redraw_requested = true;
    }

    fn commit_connection(&mut self, target: RoomNodeId) {
        let snapshot = GraphSnapshot::capture("Connect Room Nodes", &self.session.graph);

        match self.session.graph.commit_connection_drag(target) {
            Ok(true) => {
                match snapshot {
                    Ok(snapshot) => self.session.history.push(snapshot),
                    Err(e) => tracing::warn!("Could not record connection for undo: {e}"),
                }
                self.session.mark_dirty();
                tracing::debug!("Connected to {target}");
            }
            Ok(false) => tracing::debug!("Connection to {target} already exists"),
            Err(e) => tracing::debug!("Connection rejected: {e}"),
        }
    }

    // === Selection ===

    /// Select a single node
    pub fn select_node(&mut self, node_id: RoomNodeId) {
        for node in self.session.graph.nodes_mut() {
            node.set_selected(node.id() == node_id);
        }
        self.redraw_requested = true;
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        for node in self.session.graph.nodes_mut() {
            node.set_selected(false);
        }
        self.redraw_requested = true;
    }

    /// The selected node, if any
    pub fn selected_node(&self) -> Option<RoomNodeId> {
        self.session
            .graph
            .nodes()
            .find(|node| node.is_selected())
            .map(|node| node.id())
    }

    /// Delete the selected node. Returns whether a node was deleted.
    pub fn delete_selected(&mut self) -> Result<bool, ControllerError> {
        match self.selected_node() {
            Some(node) => self.delete_room_node(node).map(|()| true),
            None => Ok(false),
        }
    }

    // === Edits ===

    fn edit<T>(
        &mut self,
        description: &str,
        apply: impl FnOnce(&mut RoomNodeGraph) -> Result<T, ControllerError>,
    ) -> Result<T, ControllerError> {
        let snapshot = GraphSnapshot::capture(description, &self.session.graph)?;
        let value = apply(&mut self.session.graph)?;
        self.session.history.push(snapshot);
        self.session.mark_dirty();
        self.redraw_requested = true;
        Ok(value)
    }

    /// Create a placeholder-typed room node with its top-left corner at `position`
    pub fn create_room_node(&mut self, position: Pos2) -> Result<RoomNodeId, ControllerError> {
        let room_type = self
            .session
            .catalog()
            .none_type()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("Cannot create a room node: catalog has no placeholder type");
                ControllerError::MissingPlaceholderType
            })?;
        let rect = Rect::from_min_size(position, self.config.node_size());

        let id = self.edit("Create Room Node", |graph| Ok(graph.create_node(rect, room_type)?))?;
        tracing::info!("Created room node {id} at {position:?}");
        Ok(id)
    }

    /// Delete a node and every connection pointing at it
    pub fn delete_room_node(&mut self, node_id: RoomNodeId) -> Result<(), ControllerError> {
        if !self.session.graph.contains(node_id) {
            return Err(GraphError::NodeNotFound(node_id).into());
        }

        // A move already made stays undoable on its own
        self.end_node_drag();
        // Any other drag involving the node ends with it
        if self.mode != EditorMode::Idle {
            self.reset_interaction();
        }

        self.edit("Delete Room Node", |graph| {
            graph
                .remove_node(node_id)
                .map(|_| ())
                .ok_or_else(|| GraphError::NodeNotFound(node_id).into())
        })?;

        if self.current_node == Some(node_id) {
            self.current_node = None;
        }
        tracing::info!("Deleted room node {node_id}");
        Ok(())
    }

    /// Remove every connection from or to a node. Returns how many were removed.
    pub fn remove_room_node_links(&mut self, node_id: RoomNodeId) -> Result<usize, ControllerError> {
        let graph = &self.session.graph;
        let node = graph.node(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        if node.child_ids().is_empty() && graph.parents_of(node_id).next().is_none() {
            return Ok(0);
        }

        self.edit("Remove Room Node Links", |graph| {
            let parents: Vec<_> = graph.parents_of(node_id).collect();
            let mut removed = 0;
            for parent in parents {
                if let Some(parent) = graph.node_mut(parent) {
                    removed += usize::from(parent.remove_connection(node_id));
                }
            }
            if let Some(node) = graph.node_mut(node_id) {
                removed += node.clear_connections();
            }
            Ok(removed)
        })
    }

    /// Give a node a room type from the catalog
    pub fn assign_room_type(&mut self, node_id: RoomNodeId, room_type: &str) -> Result<(), ControllerError> {
        let room_type = self
            .session
            .catalog()
            .get(room_type)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownRoomType(room_type.to_string()))?;

        let graph = &self.session.graph;
        let node = graph.node(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        if node.room_type() == &room_type {
            return Ok(());
        }
        // Connections must not end on a placeholder node
        if room_type.is_none && graph.parents_of(node_id).next().is_some() {
            return Err(GraphError::PlaceholderTarget(node_id).into());
        }

        let name = room_type.name.clone();
        self.edit("Set Room Type", |graph| {
            let node = graph.node_mut(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
            node.set_room_type(room_type);
            Ok(())
        })?;
        tracing::debug!("Room node {node_id} is now {name:?}");
        Ok(())
    }

    /// Revert the last edit
    pub fn undo(&mut self) -> Result<(), ControllerError> {
        self.restore_history(GraphHistory::undo)
    }

    /// Reapply the last undone edit
    pub fn redo(&mut self) -> Result<(), ControllerError> {
        self.restore_history(GraphHistory::redo)
    }

    fn restore_history(
        &mut self,
        step: fn(&mut GraphHistory, &RoomNodeGraph, &RoomNodeTypeList) -> Result<RoomNodeGraph, HistoryError>,
    ) -> Result<(), ControllerError> {
        if self.mode != EditorMode::Idle {
            return Err(ControllerError::EditInProgress);
        }

        let session = &mut self.session;
        let restored = step(&mut session.history, &session.graph, &session.catalog)?;
        session.graph = restored;
        session.mark_dirty();

        self.current_node = None;
        self.context_menu = None;
        self.redraw_requested = true;
        Ok(())
    }

    /// Save the session's asset
    pub fn save(&mut self) -> Result<(), ControllerError> {
        Ok(self.session.save()?)
    }

    // === Context menus ===

    fn open_canvas_menu(&mut self, position: Pos2) {
        let items = self
            .actions
            .in_scope(ActionScope::Canvas)
            .map(|(name, entry)| MenuItem {
                label: entry.label.to_string(),
                action: name,
                argument: None,
            })
            .collect();

        self.context_menu = Some(ContextMenu {
            position,
            target: MenuTarget::Canvas,
            items,
        });
        self.redraw_requested = true;
    }

    /// Open the menu for a node at `position`
    pub fn open_node_menu(&mut self, node_id: RoomNodeId, position: Pos2) {
        let Some(node) = self.session.graph.node(node_id) else {
            return;
        };

        let mut items: Vec<MenuItem> = self
            .actions
            .in_scope(ActionScope::Node)
            .map(|(name, entry)| MenuItem {
                label: entry.label.to_string(),
                action: name,
                argument: None,
            })
            .collect();

        for (name, entry) in self.actions.in_scope(ActionScope::NodePerRoomType) {
            for room_type in self.session.catalog().assignable() {
                if room_type == node.room_type() {
                    continue;
                }
                items.push(MenuItem {
                    label: format!("{}: {}", entry.label, room_type.name),
                    action: name,
                    argument: Some(room_type.name.clone()),
                });
            }
        }

        self.context_menu = Some(ContextMenu {
            position,
            target: MenuTarget::Node(node_id),
            items,
        });
        self.redraw_requested = true;
    }

    /// Close the context menu without choosing anything
    pub fn close_context_menu(&mut self) {
        if self.context_menu.take().is_some() {
            self.redraw_requested = true;
        }
    }

    /// Run the item at `index` of the open menu and close the menu
    pub fn invoke_menu_item(&mut self, index: usize) -> Result<(), ControllerError> {
        let menu = self.context_menu.as_ref().ok_or(ControllerError::NoMenuItem(index))?;
        let item = menu.items.get(index).ok_or(ControllerError::NoMenuItem(index))?;

        let action = item.action;
        let context = ActionContext {
            position: menu.position,
            target: menu.target,
            argument: item.argument.clone(),
        };
        self.close_context_menu();
        self.invoke_action(action, &context)
    }

    /// Run a registered action by name
    pub fn invoke_action(&mut self, name: &str, context: &ActionContext) -> Result<(), ControllerError> {
        let handler = self
            .actions
            .get(name)
            .map(|entry| entry.handler)
            .ok_or_else(|| ControllerError::UnknownAction(name.to_string()))?;

        tracing::debug!("Menu action {name}");
        handler(self, context)
    }

    // === Presentation ===

    /// Paint connections, the line being dragged, then nodes in creation order
    pub fn render(&self, renderer: &mut impl GraphRenderer) {
        let graph = &self.session.graph;

        for (from, to) in graph.connections() {
            if let (Some(source), Some(target)) = (graph.node(from), graph.node(to)) {
                renderer.paint_connection(source.rect().center(), target.rect().center());
            }
        }

        if let Some(drag) = graph.connection_drag() {
            if let Some(source) = graph.node(drag.from) {
                renderer.paint_drag_line(source.rect().center(), drag.line_position);
            }
        }

        for node in graph.nodes() {
            renderer.paint_node(&NodeVisual {
                id: node.id(),
                rect: node.rect(),
                room_type: node.room_type(),
                selected: node.is_selected(),
                dragging: node.is_dragging(),
            });
        }
    }

    fn reset_interaction(&mut self) {
        self.session.graph.cancel_connection_drag();
        for node in self.session.graph.nodes_mut() {
            node.end_drag();
        }
        self.drag_snapshot = None;
        self.press_position = None;
        self.mode = EditorMode::Idle;
        self.redraw_requested = true;
    }
}

fn menu_node(context: &ActionContext) -> Result<RoomNodeId, ControllerError> {
    match context.target {
        MenuTarget::Node(node) => Ok(node),
        MenuTarget::Canvas => Err(ControllerError::NodeActionOnCanvas),
    }
}

/// Error from a controller operation
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// No action registered under this name
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Menu has no such entry or is closed
    #[error("No menu item at index {0}")]
    NoMenuItem(usize),

    /// Node action invoked from the canvas menu
    #[error("Action needs a room node")]
    NodeActionOnCanvas,

    /// Action invoked without its argument
    #[error("Action {0} needs an argument")]
    MissingActionArgument(&'static str),

    /// Catalog has no placeholder type for new nodes
    #[error("Room type catalog has no placeholder type")]
    MissingPlaceholderType,

    /// Room type not in the catalog
    #[error("Unknown room type: {0}")]
    UnknownRoomType(String),

    /// Undo/redo attempted during a drag
    #[error("Cannot change history while an edit is in progress")]
    EditInProgress,

    /// Graph rejected the edit
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// History error
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Session error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn controller() -> GraphEditorController {
        let session = EditorSession::new(RoomNodeGraph::new("Test"), RoomNodeTypeList::dungeon_defaults());
        GraphEditorController::new(session, EditorConfig::default())
    }

    fn secondary_drag(ctl: &mut GraphEditorController, from: Pos2, to: Pos2) {
        let mid = from + (to - from) * 0.5;
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, from));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Secondary, mid, mid - from));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Secondary, to, to - mid));
        ctl.handle_event(&PointerEvent::up(PointerButton::Secondary, to));
    }

    fn children(ctl: &GraphEditorController, node: RoomNodeId) -> Vec<RoomNodeId> {
        ctl.graph().node(node).unwrap().child_ids().to_vec()
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl GraphRenderer for Recorder {
        fn paint_connection(&mut self, from: Pos2, to: Pos2) {
            self.calls.push(format!("connection {from:?} {to:?}"));
        }

        fn paint_drag_line(&mut self, from: Pos2, to: Pos2) {
            self.calls.push(format!("drag {from:?} {to:?}"));
        }

        fn paint_node(&mut self, node: &NodeVisual<'_>) {
            self.calls.push(format!("node {} selected={}", node.room_type.name, node.selected));
        }
    }

    #[test]
    fn test_create_from_canvas_menu() {
        let mut ctl = controller();
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(30.0, 40.0)));

        let menu = ctl.context_menu().unwrap();
        assert_eq!(menu.target, MenuTarget::Canvas);
        assert_eq!(menu.items[0].action, ACTION_CREATE_ROOM_NODE);

        ctl.invoke_menu_item(0).unwrap();
        assert!(ctl.context_menu().is_none());

        let node = ctl.graph().nodes().next().unwrap();
        assert!(node.is_placeholder());
        assert_eq!(node.rect(), Rect::from_min_size(Pos2::new(30.0, 40.0), Vec2::new(160.0, 75.0)));
        assert!(ctl.session().is_dirty());
    }

    #[test]
    fn test_connection_drag_commits_once() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let n2 = ctl.create_room_node(Pos2::new(200.0, 0.0)).unwrap();
        ctl.assign_room_type(n2, "Small Room").unwrap();

        secondary_drag(&mut ctl, Pos2::new(80.0, 37.0), Pos2::new(280.0, 37.0));
        assert_eq!(children(&ctl, n1), vec![n2]);
        assert_eq!(ctl.mode(), EditorMode::Idle);

        secondary_drag(&mut ctl, Pos2::new(80.0, 37.0), Pos2::new(280.0, 37.0));
        assert_eq!(children(&ctl, n1), vec![n2]);
        assert!(ctl.context_menu().is_none());
    }

    #[test]
    fn test_connection_to_placeholder_rejected() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        ctl.create_room_node(Pos2::new(200.0, 0.0)).unwrap();

        secondary_drag(&mut ctl, Pos2::new(80.0, 37.0), Pos2::new(280.0, 37.0));
        assert!(children(&ctl, n1).is_empty());
        assert!(!ctl.graph().is_connecting());
        assert_eq!(ctl.mode(), EditorMode::Idle);
    }

    #[test]
    fn test_release_over_empty_canvas_cancels() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(80.0, 37.0)));
        assert!(matches!(ctl.mode(), EditorMode::ConnectionDragging { source, .. } if source == n1));
        ctl.handle_event(&PointerEvent::drag(
            PointerButton::Secondary,
            Pos2::new(500.0, 300.0),
            Vec2::new(420.0, 263.0),
        ));
        assert_eq!(
            ctl.graph().connection_drag().map(|d| d.line_position),
            Some(Pos2::new(500.0, 300.0))
        );

        ctl.handle_event(&PointerEvent::up(PointerButton::Secondary, Pos2::new(500.0, 300.0)));
        assert!(children(&ctl, n1).is_empty());
        assert!(ctl.graph().connection_drag().is_none());
        assert_eq!(ctl.mode(), EditorMode::Idle);
        assert!(ctl.context_menu().is_none());
    }

    #[test]
    fn test_release_on_source_never_self_loops() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        ctl.assign_room_type(n1, "Corridor").unwrap();

        secondary_drag(&mut ctl, Pos2::new(20.0, 20.0), Pos2::new(120.0, 50.0));
        assert!(children(&ctl, n1).is_empty());
        assert!(!ctl.graph().is_connecting());
        assert!(ctl.context_menu().is_none());
    }

    #[test]
    fn test_primary_drag_moves_node() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(10.0, 10.0)));
        assert!(matches!(ctl.mode(), EditorMode::NodeDragging { node, .. } if node == n1));
        assert_eq!(ctl.selected_node(), Some(n1));

        ctl.handle_event(&PointerEvent::drag(PointerButton::Primary, Pos2::new(30.0, 20.0), Vec2::new(20.0, 10.0)));
        // Pointer leaves the node; the node keeps following
        ctl.handle_event(&PointerEvent::drag(PointerButton::Primary, Pos2::new(260.0, 200.0), Vec2::new(30.0, 20.0)));
        ctl.handle_event(&PointerEvent::up(PointerButton::Primary, Pos2::new(260.0, 200.0)));

        let node = ctl.graph().node(n1).unwrap();
        assert_eq!(node.position(), Pos2::new(50.0, 30.0));
        assert!(!node.is_dragging());
        assert_eq!(ctl.mode(), EditorMode::Idle);
    }

    #[test]
    fn test_connection_drag_blocks_node_drag() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let n2 = ctl.create_room_node(Pos2::new(200.0, 0.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(50.0, 30.0)));
        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(250.0, 30.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Primary, Pos2::new(260.0, 30.0), Vec2::new(10.0, 0.0)));

        assert!(matches!(ctl.mode(), EditorMode::ConnectionDragging { source, .. } if source == n1));
        assert!(!ctl.graph().node(n2).unwrap().is_dragging());
        assert_eq!(ctl.graph().node(n2).unwrap().position(), Pos2::new(200.0, 0.0));
    }

    #[test]
    fn test_overlapping_nodes_later_wins() {
        let mut ctl = controller();
        ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let top = ctl.create_room_node(Pos2::new(40.0, 20.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(100.0, 50.0)));
        assert_eq!(ctl.current_node(), Some(top));
        assert_eq!(ctl.selected_node(), Some(top));
    }

    #[test]
    fn test_node_menu_delete_keeps_graph_consistent() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let n2 = ctl.create_room_node(Pos2::new(200.0, 0.0)).unwrap();
        ctl.assign_room_type(n2, "Boss Room").unwrap();
        secondary_drag(&mut ctl, Pos2::new(80.0, 37.0), Pos2::new(280.0, 37.0));
        assert_eq!(children(&ctl, n1), vec![n2]);

        // Secondary click without travel opens the node menu
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(250.0, 30.0)));
        ctl.handle_event(&PointerEvent::up(PointerButton::Secondary, Pos2::new(250.0, 30.0)));
        let menu = ctl.context_menu().unwrap();
        assert_eq!(menu.target, MenuTarget::Node(n2));
        let delete = menu.items.iter().position(|i| i.action == ACTION_DELETE_ROOM_NODE).unwrap();
        assert!(menu
            .items
            .iter()
            .filter(|i| i.action == ACTION_ASSIGN_ROOM_TYPE)
            .all(|i| i.argument.as_deref() != Some("Boss Room")));

        ctl.invoke_menu_item(delete).unwrap();
        assert!(!ctl.graph().contains(n2));
        assert!(children(&ctl, n1).is_empty());
        assert!(ctl.graph().validate().is_ok());
    }

    #[test]
    fn test_assign_type_from_menu() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        ctl.open_node_menu(n1, Pos2::new(10.0, 10.0));

        let index = ctl
            .context_menu()
            .unwrap()
            .items
            .iter()
            .position(|i| i.argument.as_deref() == Some("Entrance"))
            .unwrap();
        ctl.invoke_menu_item(index).unwrap();
        assert_eq!(ctl.graph().node(n1).unwrap().room_type().name, "Entrance");
    }

    #[test]
    fn test_placeholder_type_refused_for_connected_target() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let n2 = ctl.create_room_node(Pos2::new(200.0, 0.0)).unwrap();
        ctl.assign_room_type(n2, "Corridor").unwrap();
        secondary_drag(&mut ctl, Pos2::new(80.0, 37.0), Pos2::new(280.0, 37.0));

        assert!(matches!(
            ctl.assign_room_type(n2, "None"),
            Err(ControllerError::Graph(GraphError::PlaceholderTarget(_)))
        ));
        assert!(matches!(ctl.assign_room_type(n2, "Moat"), Err(ControllerError::UnknownRoomType(_))));

        assert_eq!(ctl.remove_room_node_links(n2).unwrap(), 1);
        assert!(children(&ctl, n1).is_empty());
        ctl.assign_room_type(n2, "None").unwrap();
    }

    #[test]
    fn test_primary_press_on_canvas_clears_selection_and_menu() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        ctl.select_node(n1);
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(400.0, 400.0)));
        assert!(ctl.context_menu().is_some());

        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(500.0, 500.0)));
        assert!(ctl.context_menu().is_none());
        assert_eq!(ctl.selected_node(), None);
        assert!(!ctl.delete_selected().unwrap());
    }

    #[test]
    fn test_undo_redo_edits() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(10.0, 10.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Primary, Pos2::new(60.0, 40.0), Vec2::new(50.0, 30.0)));
        ctl.handle_event(&PointerEvent::up(PointerButton::Primary, Pos2::new(60.0, 40.0)));
        assert_eq!(ctl.session().history().undo_description(), Some("Move Room Node"));

        ctl.undo().unwrap();
        assert_eq!(ctl.graph().node(n1).unwrap().position(), Pos2::ZERO);
        ctl.undo().unwrap();
        assert_eq!(ctl.graph().node_count(), 0);
        assert!(matches!(ctl.undo(), Err(ControllerError::History(HistoryError::NothingToUndo))));

        ctl.redo().unwrap();
        ctl.redo().unwrap();
        assert_eq!(ctl.graph().node(n1).unwrap().position(), Pos2::new(50.0, 30.0));
    }

    #[test]
    fn test_click_without_move_records_no_history() {
        let mut ctl = controller();
        ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let depth = ctl.session().history().undo_depth();

        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(10.0, 10.0)));
        ctl.handle_event(&PointerEvent::up(PointerButton::Primary, Pos2::new(10.0, 10.0)));
        assert_eq!(ctl.session().history().undo_depth(), depth);
    }

    #[test]
    fn test_undo_refused_mid_drag() {
        let mut ctl = controller();
        ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(10.0, 10.0)));
        assert!(matches!(ctl.undo(), Err(ControllerError::EditInProgress)));
    }

    #[test]
    fn test_end_session_clears_transient_state() {
        let mut ctl = controller();
        ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(10.0, 10.0)));
        assert!(ctl.graph().is_connecting());

        let session = ctl.end_session();
        assert!(!session.graph().is_connecting());
        assert_eq!(session.graph().node_count(), 1);
    }

    #[test]
    fn test_render_order() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();
        let n2 = ctl.create_room_node(Pos2::new(200.0, 0.0)).unwrap();
        ctl.assign_room_type(n1, "Entrance").unwrap();
        ctl.assign_room_type(n2, "Corridor").unwrap();
        secondary_drag(&mut ctl, Pos2::new(80.0, 37.0), Pos2::new(280.0, 37.0));
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(280.0, 37.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Secondary, Pos2::new(600.0, 37.0), Vec2::new(320.0, 0.0)));

        let mut recorder = Recorder::default();
        ctl.render(&mut recorder);
        assert_eq!(
            recorder.calls,
            vec![
                format!("connection {:?} {:?}", Pos2::new(80.0, 37.5), Pos2::new(280.0, 37.5)),
                format!("drag {:?} {:?}", Pos2::new(280.0, 37.5), Pos2::new(600.0, 37.0)),
                "node Entrance selected=false".to_string(),
                "node Corridor selected=false".to_string(),
            ]
        );
        assert!(ctl.take_redraw_request());
        assert!(!ctl.take_redraw_request());
    }

    #[test]
    fn test_unknown_action_and_missing_menu() {
        let mut ctl = controller();
        let context = ActionContext {
            position: Pos2::ZERO,
            target: MenuTarget::Canvas,
            argument: None,
        };
        assert!(matches!(
            ctl.invoke_action("explode", &context),
            Err(ControllerError::UnknownAction(_))
        ));
        assert!(matches!(
            ctl.invoke_action(ACTION_DELETE_ROOM_NODE, &context),
            Err(ControllerError::NodeActionOnCanvas)
        ));
        assert!(matches!(ctl.invoke_menu_item(0), Err(ControllerError::NoMenuItem(0))));
        assert_eq!(
            ctl.actions().names().collect::<Vec<_>>(),
            vec![
                ACTION_CREATE_ROOM_NODE,
                ACTION_DELETE_ROOM_NODE,
                ACTION_REMOVE_ROOM_NODE_LINKS,
                ACTION_ASSIGN_ROOM_TYPE,
            ]
        );
    }

    #[test]
    fn test_delete_during_drag_keeps_move_undoable() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Primary, Pos2::new(10.0, 10.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Primary, Pos2::new(60.0, 40.0), Vec2::new(50.0, 30.0)));
        assert!(ctl.delete_selected().unwrap());
        assert_eq!(ctl.mode(), EditorMode::Idle);
        assert!(!ctl.graph().contains(n1));

        ctl.undo().unwrap();
        assert_eq!(ctl.graph().node(n1).map(|n| n.position()), Some(Pos2::new(50.0, 30.0)));
        assert_eq!(ctl.session().history().undo_description(), Some("Move Room Node"));

        ctl.undo().unwrap();
        assert_eq!(ctl.graph().node(n1).map(|n| n.position()), Some(Pos2::ZERO));
        assert!(ctl.session().history().can_undo());
        assert_eq!(ctl.session().history().redo_description(), Some("Move Room Node"));
    }

    #[test]
    fn test_secondary_click_tolerates_jitter() {
        let mut ctl = controller();
        let n1 = ctl.create_room_node(Pos2::new(0.0, 0.0)).unwrap();

        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(50.0, 30.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Secondary, Pos2::new(50.5, 30.0), Vec2::new(0.5, 0.0)));
        ctl.handle_event(&PointerEvent::up(PointerButton::Secondary, Pos2::new(50.5, 30.0)));
        assert_eq!(ctl.context_menu().map(|m| m.target), Some(MenuTarget::Node(n1)));

        // Travel beyond the threshold and back is a drag, not a click
        ctl.close_context_menu();
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(50.0, 30.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Secondary, Pos2::new(60.0, 30.0), Vec2::new(10.0, 0.0)));
        ctl.handle_event(&PointerEvent::drag(PointerButton::Secondary, Pos2::new(51.0, 30.0), Vec2::new(-9.0, 0.0)));
        ctl.handle_event(&PointerEvent::up(PointerButton::Secondary, Pos2::new(51.0, 30.0)));
        assert!(ctl.context_menu().is_none());
    }

    #[test]
    fn test_bad_menu_index_keeps_menu_open() {
        let mut ctl = controller();
        ctl.handle_event(&PointerEvent::down(PointerButton::Secondary, Pos2::new(400.0, 400.0)));
        let items = ctl.context_menu().unwrap().items.len();

        assert!(matches!(ctl.invoke_menu_item(items), Err(ControllerError::NoMenuItem(_))));
        assert!(ctl.context_menu().is_some());

        ctl.invoke_menu_item(0).unwrap();
        assert!(ctl.context_menu().is_none());
        assert_eq!(ctl.graph().node_count(), 1);
    }
}
