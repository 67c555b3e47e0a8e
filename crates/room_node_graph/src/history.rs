// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of graph snapshots.
//!
//! Each entry holds the bincode encoding of the graph asset as it was before
//! an edit. Undo swaps the current graph for that snapshot and keeps the
//! current state on the redo stack.

use crate::graph::RoomNodeGraph;
use crate::persistence::{AssetError, GraphAsset};
use crate::room_type::RoomNodeTypeList;
use std::collections::VecDeque;
use thiserror::Error;

/// Default maximum undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Snapshot could not be turned back into a graph
    #[error("Snapshot restore failed: {0}")]
    Restore(#[from] AssetError),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Encoded graph state
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    /// Human-readable description of the edit that followed
    pub description: String,
    data: Vec<u8>,
}

impl GraphSnapshot {
    /// Capture a graph
    pub fn capture(description: impl Into<String>, graph: &RoomNodeGraph) -> Result<Self> {
        let data = bincode::serialize(&GraphAsset::from_graph(graph))?;
        Ok(Self {
            description: description.into(),
            data,
        })
    }

    /// Rebuild the captured graph
    pub fn restore(&self, catalog: &RoomNodeTypeList) -> Result<RoomNodeGraph> {
        let asset: GraphAsset = bincode::deserialize(&self.data)?;
        Ok(asset.into_graph(catalog)?)
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct GraphHistory {
    undo_stack: VecDeque<GraphSnapshot>,
    redo_stack: VecDeque<GraphSnapshot>,
    max_depth: usize,
}

impl GraphHistory {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    /// Record the graph as it is before an edit
    pub fn record(&mut self, description: &str, graph: &RoomNodeGraph) -> Result<()> {
        let snapshot = GraphSnapshot::capture(description, graph)?;
        self.push(snapshot);
        Ok(())
    }

    /// Push an already captured pre-edit snapshot
    pub fn push(&mut self, snapshot: GraphSnapshot) {
        if self.max_depth == 0 {
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);

        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Undo the last edit, returning the graph to switch to
    pub fn undo(&mut self, current: &RoomNodeGraph, catalog: &RoomNodeTypeList) -> Result<RoomNodeGraph> {
        let snapshot = self.undo_stack.back().ok_or(HistoryError::NothingToUndo)?;
        let restored = snapshot.restore(catalog)?;
        let redo = GraphSnapshot::capture(snapshot.description.clone(), current)?;

        self.undo_stack.pop_back();
        self.redo_stack.push_back(redo);
        Ok(restored)
    }

    /// Redo the last undone edit, returning the graph to switch to
    pub fn redo(&mut self, current: &RoomNodeGraph, catalog: &RoomNodeTypeList) -> Result<RoomNodeGraph> {
        let snapshot = self.redo_stack.back().ok_or(HistoryError::NothingToRedo)?;
        let restored = snapshot.restore(catalog)?;
        let undo = GraphSnapshot::capture(snapshot.description.clone(), current)?;

        self.redo_stack.pop_back();
        self.undo_stack.push_back(undo);
        Ok(restored)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|s| s.description.as_str())
    }

    /// Total encoded size of all snapshots
    pub fn memory_used(&self) -> usize {
        self.undo_stack.iter().chain(self.redo_stack.iter()).map(GraphSnapshot::size).sum()
    }
}

impl Default for GraphHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Rect, Vec2};

    fn add_room(graph: &mut RoomNodeGraph, catalog: &RoomNodeTypeList, x: f32) {
        let rect = Rect::from_min_size(Pos2::new(x, 0.0), Vec2::new(160.0, 75.0));
        graph.create_node(rect, catalog.get("Corridor").cloned().unwrap()).unwrap();
    }

    #[test]
    fn test_undo_redo() {
        let catalog = RoomNodeTypeList::dungeon_defaults();
        let mut history = GraphHistory::new();
        let mut graph = RoomNodeGraph::default();

        history.record("Create Room Node", &graph).unwrap();
        add_room(&mut graph, &catalog, 0.0);
        assert_eq!(history.undo_description(), Some("Create Room Node"));

        graph = history.undo(&graph, &catalog).unwrap();
        assert_eq!(graph.node_count(), 0);
        assert!(history.can_redo());

        graph = history.redo(&graph, &catalog).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert!(matches!(history.redo(&graph, &catalog), Err(HistoryError::NothingToRedo)));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let catalog = RoomNodeTypeList::dungeon_defaults();
        let mut history = GraphHistory::new();
        let mut graph = RoomNodeGraph::default();

        history.record("a", &graph).unwrap();
        add_room(&mut graph, &catalog, 0.0);
        graph = history.undo(&graph, &catalog).unwrap();
        assert!(history.can_redo());

        history.record("b", &graph).unwrap();
        assert!(!history.can_redo());
        assert!(history.memory_used() > 0);
    }

    #[test]
    fn test_depth_limit() {
        let catalog = RoomNodeTypeList::dungeon_defaults();
        let mut history = GraphHistory::with_max_depth(2);
        let mut graph = RoomNodeGraph::default();

        for i in 0..4 {
            history.record("add", &graph).unwrap();
            add_room(&mut graph, &catalog, i as f32 * 200.0);
        }

        assert_eq!(history.undo_depth(), 2);
        graph = history.undo(&graph, &catalog).unwrap();
        graph = history.undo(&graph, &catalog).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(matches!(history.undo(&graph, &catalog), Err(HistoryError::NothingToUndo)));
    }
}
