// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.

use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor configuration file name
pub const CONFIG_FILE_NAME: &str = "room_graph_editor.ron";

/// Layout and behaviour settings for the graph editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of newly created nodes
    pub node_width: f32,
    /// Height of newly created nodes
    pub node_height: f32,
    /// Inner padding of the node box
    pub node_padding: f32,
    /// Node border thickness
    pub node_border: f32,
    /// Stroke width of connection lines
    pub connecting_line_width: f32,
    /// Horizontal pull of connection curves
    pub bezier_curvature: f32,
    /// Maximum undo steps kept
    pub history_depth: usize,
    /// Outline a node while it is dragged, as if selected
    pub highlight_dragged_nodes: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 75.0,
            node_padding: 25.0,
            node_border: 12.0,
            connecting_line_width: 3.0,
            bezier_curvature: 50.0,
            history_depth: 100,
            highlight_dragged_nodes: true,
        }
    }
}

impl EditorConfig {
    /// Size of newly created nodes
    pub fn node_size(&self) -> Vec2 {
        Vec2::new(self.node_width, self.node_height)
    }

    /// Load configuration from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = ron::from_str(&content)?;

        if config.node_width <= 0.0 || config.node_height <= 0.0 {
            return Err(ConfigError::InvalidNodeSize(config.node_width, config.node_height));
        }

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No editor config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Error when loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File error
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Write error
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Node size must be positive
    #[error("Invalid node size: {0}x{1}")]
    InvalidNodeSize(f32, f32),
}
