// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: one open graph asset together with its room type catalog,
//! file location, dirty flag and undo history.

use crate::graph::RoomNodeGraph;
use crate::history::GraphHistory;
use crate::persistence::{self, AssetError};
use crate::room_type::RoomNodeTypeList;
use std::path::{Path, PathBuf};

/// An open graph being edited
#[derive(Debug)]
pub struct EditorSession {
    pub(crate) graph: RoomNodeGraph,
    pub(crate) catalog: RoomNodeTypeList,
    asset_path: Option<PathBuf>,
    dirty: bool,
    pub(crate) history: GraphHistory,
}

impl EditorSession {
    /// Start a session on an in-memory graph
    pub fn new(graph: RoomNodeGraph, catalog: RoomNodeTypeList) -> Self {
        Self {
            graph,
            catalog,
            asset_path: None,
            dirty: false,
            history: GraphHistory::new(),
        }
    }

    /// Open a graph asset from disk
    pub fn open(path: &Path, catalog: RoomNodeTypeList) -> Result<Self, SessionError> {
        let graph = persistence::load_graph(path, &catalog)?;
        Ok(Self {
            graph,
            catalog,
            asset_path: Some(path.to_path_buf()),
            dirty: false,
            history: GraphHistory::new(),
        })
    }

    /// Save to the path the session was opened from or last saved to
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.asset_path.clone().ok_or(SessionError::NoAssetPath)?;
        self.save_as(&path)
    }

    /// Save to a new path and remember it
    pub fn save_as(&mut self, path: &Path) -> Result<(), SessionError> {
        persistence::save_graph(&self.graph, path)?;
        self.asset_path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// The graph being edited
    pub fn graph(&self) -> &RoomNodeGraph {
        &self.graph
    }

    /// Room type catalog
    pub fn catalog(&self) -> &RoomNodeTypeList {
        &self.catalog
    }

    /// Asset file, if any
    pub fn asset_path(&self) -> Option<&Path> {
        self.asset_path.as_deref()
    }

    /// Check if the graph has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Undo history
    pub fn history(&self) -> &GraphHistory {
        &self.history
    }
}

/// Error when opening or saving a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Save without a known file location
    #[error("No asset path set")]
    NoAssetPath,

    /// Asset could not be read or written
    #[error(transparent)]
    Asset(#[from] AssetError),
}
