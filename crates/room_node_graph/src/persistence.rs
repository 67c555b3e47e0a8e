// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph asset format.
//!
//! [`GraphAsset`] is the serialized form of a [`RoomNodeGraph`]. Each node
//! is written with its id, rectangle, room type name and outgoing connection
//! ids. Room types are reattached to the catalog by name on load, and the
//! loaded graph is validated rather than repaired.

use crate::graph::{GraphError, RoomNodeGraph};
use crate::node::{RoomNode, RoomNodeId};
use crate::room_type::RoomNodeTypeList;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Current graph asset format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomNodeRecord {
    /// Node id
    pub id: RoomNodeId,
    /// Top-left corner
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Room type name
    pub room_type: String,
    /// Outgoing connections
    #[serde(default)]
    pub child_ids: Vec<RoomNodeId>,
}

impl RoomNodeRecord {
    fn from_node(node: &RoomNode) -> Self {
        let rect = node.rect();
        Self {
            id: node.id(),
            position: [rect.min.x, rect.min.y],
            size: [rect.width(), rect.height()],
            room_type: node.room_type().name.clone(),
            child_ids: node.child_ids().to_vec(),
        }
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.position[0], self.position[1]),
            Vec2::new(self.size[0], self.size[1]),
        )
    }
}

/// Serialized graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAsset {
    /// Format version
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Nodes in creation order
    pub nodes: Vec<RoomNodeRecord>,
}

impl GraphAsset {
    /// Capture a graph. Drag and selection state are not part of the asset.
    pub fn from_graph(graph: &RoomNodeGraph) -> Self {
        Self {
            version: GRAPH_FORMAT_VERSION,
            name: graph.name.clone(),
            nodes: graph.nodes().map(RoomNodeRecord::from_node).collect(),
        }
    }

    /// Rebuild the graph, attaching each node to its catalog room type
    pub fn into_graph(self, catalog: &RoomNodeTypeList) -> Result<RoomNodeGraph, AssetError> {
        if self.version > GRAPH_FORMAT_VERSION {
            return Err(AssetError::UnsupportedVersion(self.version));
        }

        let mut graph = RoomNodeGraph::new(self.name);

        for record in self.nodes {
            let room_type = catalog
                .get(&record.room_type)
                .cloned()
                .ok_or_else(|| AssetError::UnknownRoomType {
                    node: record.id,
                    room_type: record.room_type.clone(),
                })?;

            let mut node = RoomNode::with_id(record.id, record.rect(), room_type)
                .map_err(GraphError::from)?;

            let mut seen = HashSet::new();
            for child in record.child_ids {
                if !seen.insert(child) || !node.add_connection(child) {
                    return Err(AssetError::InvalidConnection { from: record.id, to: child });
                }
            }

            graph.add_node(node)?;
        }

        // Edges may point forward in the node list, so check only once all
        // nodes are present.
        graph.validate()?;

        Ok(graph)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, AssetError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Parse RON
    pub fn from_ron(s: &str) -> Result<Self, AssetError> {
        Ok(ron::from_str(s)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, AssetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON
    pub fn from_json(s: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read an asset; `.json` files are JSON, anything else RON
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let content = std::fs::read_to_string(path)?;
        match AssetFormat::from_path(path) {
            AssetFormat::Ron => Self::from_ron(&content),
            AssetFormat::Json => Self::from_json(&content),
        }
    }

    /// Write an asset in the format given by the file extension
    pub fn save(&self, path: &Path) -> Result<(), AssetError> {
        let content = match AssetFormat::from_path(path) {
            AssetFormat::Ron => self.to_ron()?,
            AssetFormat::Json => self.to_json()?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Text encoding of a graph asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    /// Rusty Object Notation
    Ron,
    /// JSON
    Json,
}

impl AssetFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }
}

/// Load a graph asset and attach it to a catalog
pub fn load_graph(path: &Path, catalog: &RoomNodeTypeList) -> Result<RoomNodeGraph, AssetError> {
    let graph = GraphAsset::load(path)?.into_graph(catalog)?;
    tracing::info!("Loaded room node graph {:?} ({} nodes) from {:?}", graph.name, graph.node_count(), path);
    Ok(graph)
}

/// Save a graph asset
pub fn save_graph(graph: &RoomNodeGraph, path: &Path) -> Result<(), AssetError> {
    GraphAsset::from_graph(graph).save(path)?;
    tracing::info!("Saved room node graph {:?} to {:?}", graph.name, path);
    Ok(())
}

/// Error when reading or writing a graph asset
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// File error
    #[error("Asset file error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON write error
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Written by a newer editor
    #[error("Graph asset version {0} is newer than this editor supports")]
    UnsupportedVersion(u32),

    /// Room type name not in the catalog
    #[error("Node {node} has unknown room type {room_type:?}")]
    UnknownRoomType {
        /// Node carrying the type
        node: RoomNodeId,
        /// Type name as written
        room_type: String,
    },

    /// Self-loop or repeated connection in the stored child list
    #[error("Invalid connection from {from} to {to}")]
    InvalidConnection {
        /// Source node
        from: RoomNodeId,
        /// Target node
        to: RoomNodeId,
    },

    /// Graph invariant violated by the stored data
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}
