// SPDX-License-Identifier: MIT OR Apache-2.0
//! Context menus and the action table behind them.
//!
//! Each menu entry names an action registered in the controller's
//! [`ActionTable`]. The host only presents [`ContextMenu::items`] and reports
//! which one was picked.

use crate::controller::{ControllerError, GraphEditorController};
use crate::node::RoomNodeId;
use egui::Pos2;
use indexmap::IndexMap;
use std::fmt;

/// What a context menu was opened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    /// Empty canvas
    Canvas,
    /// A room node
    Node(RoomNodeId),
}

/// One entry of a context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Text shown to the user
    pub label: String,
    /// Action name in the action table
    pub action: &'static str,
    /// Extra argument for the action (room type name for type assignment)
    pub argument: Option<String>,
}

/// An open context menu
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// Where the menu was requested (canvas space)
    pub position: Pos2,
    /// What the menu acts on
    pub target: MenuTarget,
    /// Entries in display order
    pub items: Vec<MenuItem>,
}

/// Arguments passed to an action handler
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    /// Canvas position the menu was opened at
    pub position: Pos2,
    /// Menu target
    pub target: MenuTarget,
    /// Item argument
    pub argument: Option<String>,
}

/// Controller method invoked by an action
pub type ActionHandler = fn(&mut GraphEditorController, &ActionContext) -> Result<(), ControllerError>;

/// Which menu an action appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    /// Canvas menu
    Canvas,
    /// Node menu
    Node,
    /// Node menu, one entry per assignable room type
    NodePerRoomType,
}

/// A registered action
#[derive(Clone, Copy)]
pub struct ActionEntry {
    /// Menu label (prefix for per-room-type entries)
    pub label: &'static str,
    /// Menu the action belongs to
    pub scope: ActionScope,
    /// Method to call
    pub handler: ActionHandler,
}

/// Action names mapped to controller methods
#[derive(Clone, Default)]
pub struct ActionTable {
    entries: IndexMap<&'static str, ActionEntry>,
}

impl ActionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, replacing any previous one with the same name
    pub fn register(
        &mut self,
        name: &'static str,
        label: &'static str,
        scope: ActionScope,
        handler: ActionHandler,
    ) {
        self.entries.insert(name, ActionEntry { label, scope, handler });
    }

    /// Look up an action
    pub fn get(&self, name: &str) -> Option<&ActionEntry> {
        self.entries.get(name)
    }

    /// Registered action names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Actions for a menu scope
    pub fn in_scope(&self, scope: ActionScope) -> impl Iterator<Item = (&'static str, &ActionEntry)> {
        self.entries
            .iter()
            .filter(move |(_, entry)| entry.scope == scope)
            .map(|(name, entry)| (*name, entry))
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
