// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room type catalog.
//!
//! Room types are external configuration: the editor only consumes the
//! catalog. Exactly one entry is the placeholder ("none") type that newly
//! created nodes start with.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the placeholder type in the built-in catalog
pub const NONE_ROOM_TYPE: &str = "None";

/// A room type entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNodeType {
    /// Display name, unique within a catalog
    pub name: String,
    /// Marks the placeholder type assigned to unconfigured nodes
    #[serde(default)]
    pub is_none: bool,
}

impl RoomNodeType {
    /// Create a regular room type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_none: false,
        }
    }

    /// Create the placeholder type
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_none: true,
        }
    }
}

/// Ordered catalog of room types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNodeTypeList {
    types: Vec<RoomNodeType>,
}

impl RoomNodeTypeList {
    /// Build a catalog, checking that names are unique and that exactly one
    /// placeholder type exists
    pub fn new(types: Vec<RoomNodeType>) -> Result<Self, CatalogError> {
        let list = Self { types };
        list.validate()?;
        Ok(list)
    }

    /// The built-in dungeon catalog
    pub fn dungeon_defaults() -> Self {
        let names = [
            "Corridor",
            "CorridorNS",
            "CorridorEW",
            "Entrance",
            "Small Room",
            "Medium Room",
            "Large Room",
            "Chest Room",
            "Boss Room",
        ];

        let mut types = vec![RoomNodeType::placeholder(NONE_ROOM_TYPE)];
        types.extend(names.into_iter().map(RoomNodeType::new));
        Self { types }
    }

    /// Load a catalog from a RON file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let list: RoomNodeTypeList = ron::from_str(&content)?;
        list.validate()?;
        tracing::info!("Loaded {} room types from {:?}", list.len(), path);
        Ok(list)
    }

    /// Save the catalog as RON
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (i, room_type) in self.types.iter().enumerate() {
            if self.types[..i].iter().any(|t| t.name == room_type.name) {
                return Err(CatalogError::DuplicateName(room_type.name.clone()));
            }
        }

        match self.types.iter().filter(|t| t.is_none).count() {
            0 => Err(CatalogError::MissingPlaceholder),
            1 => Ok(()),
            n => Err(CatalogError::MultiplePlaceholders(n)),
        }
    }

    /// The placeholder type used for newly created nodes
    pub fn none_type(&self) -> Option<&RoomNodeType> {
        self.types.iter().find(|t| t.is_none)
    }

    /// Look up a type by name
    pub fn get(&self, name: &str) -> Option<&RoomNodeType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// All types in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &RoomNodeType> {
        self.types.iter()
    }

    /// Types a designer can assign to a node
    pub fn assignable(&self) -> impl Iterator<Item = &RoomNodeType> {
        self.types.iter().filter(|t| !t.is_none)
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for RoomNodeTypeList {
    fn default() -> Self {
        Self::dungeon_defaults()
    }
}

/// Error when building or loading a room type catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No placeholder type
    #[error("Room type catalog has no placeholder type")]
    MissingPlaceholder,

    /// More than one placeholder type
    #[error("Room type catalog has {0} placeholder types, expected one")]
    MultiplePlaceholders(usize),

    /// Two types share a name
    #[error("Duplicate room type name: {0}")]
    DuplicateName(String),

    /// File error
    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Catalog parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Write error
    #[error("Catalog serialization error: {0}")]
    Serialize(#[from] ron::Error),
}
