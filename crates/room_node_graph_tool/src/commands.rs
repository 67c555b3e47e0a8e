// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tool commands. Output goes to the given writer; logging goes through
//! `tracing`.

use room_node_graph::persistence::AssetError;
use room_node_graph::room_type::CatalogError;
use room_node_graph::{load_graph, save_graph, RoomNodeGraph, RoomNodeTypeList};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Error from a tool command
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Room type catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Graph asset could not be read or written
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Refused to overwrite a file
    #[error("{0:?} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    /// Output error
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

fn load_catalog(path: Option<&Path>) -> Result<RoomNodeTypeList, ToolError> {
    match path {
        Some(path) => Ok(RoomNodeTypeList::load(path)?),
        None => Ok(RoomNodeTypeList::dungeon_defaults()),
    }
}

pub fn new_graph(path: &Path, name: &str, force: bool) -> Result<(), ToolError> {
    if path.exists() && !force {
        return Err(ToolError::AlreadyExists(path.to_path_buf()));
    }

    save_graph(&RoomNodeGraph::new(name), path)?;
    Ok(())
}

pub fn validate(path: &Path, catalog: Option<&Path>, out: &mut impl Write) -> Result<(), ToolError> {
    let catalog = load_catalog(catalog)?;
    let graph = load_graph(path, &catalog)?;

    writeln!(
        out,
        "{:?} is valid: {} rooms, {} connections",
        graph.name,
        graph.node_count(),
        graph.connection_count()
    )?;
    Ok(())
}

pub fn info(path: &Path, catalog: Option<&Path>, out: &mut impl Write) -> Result<(), ToolError> {
    let catalog = load_catalog(catalog)?;
    let graph = load_graph(path, &catalog)?;

    writeln!(out, "{}", graph.name)?;
    for (index, node) in graph.nodes().enumerate() {
        let rect = node.rect();
        writeln!(
            out,
            "{index:>3}  {}  {:<12} at ({}, {}) size {}x{}",
            node.id(),
            node.room_type().name,
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height()
        )?;
        for child in node.child_ids() {
            let child_type = graph.node(*child).map_or("?", |c| c.room_type().name.as_str());
            writeln!(out, "       -> {child} ({child_type})")?;
        }
    }
    Ok(())
}

pub fn print_catalog(catalog: Option<&Path>, out: &mut impl Write) -> Result<(), ToolError> {
    let catalog = load_catalog(catalog)?;
    for room_type in catalog.iter() {
        let marker = if room_type.is_none { " (placeholder)" } else { "" };
        writeln!(out, "{}{marker}", room_type.name)?;
    }
    Ok(())
}

pub fn convert(input: &Path, output: &Path, catalog: Option<&Path>) -> Result<(), ToolError> {
    let catalog = load_catalog(catalog)?;
    let graph = load_graph(input, &catalog)?;
    save_graph(&graph, output)?;
    tracing::info!("Converted {:?} to {:?}", input, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_node_graph::egui::{Pos2, Rect, Vec2};

    fn sample_graph(catalog: &RoomNodeTypeList) -> RoomNodeGraph {
        let mut graph = RoomNodeGraph::new("Crypt");
        let size = Vec2::new(160.0, 75.0);
        let entrance = graph
            .create_node(Rect::from_min_size(Pos2::ZERO, size), catalog.get("Entrance").cloned().unwrap())
            .unwrap();
        let boss = graph
            .create_node(
                Rect::from_min_size(Pos2::new(200.0, 0.0), size),
                catalog.get("Boss Room").cloned().unwrap(),
            )
            .unwrap();
        graph.node_mut(entrance).unwrap().add_connection(boss);
        graph
    }

    #[test]
    fn test_new_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ron");

        new_graph(&path, "Empty", false).unwrap();
        assert!(matches!(new_graph(&path, "Empty", false), Err(ToolError::AlreadyExists(_))));
        new_graph(&path, "Empty", true).unwrap();

        let mut out = Vec::new();
        validate(&path, None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"Empty\" is valid: 0 rooms, 0 connections\n");
    }

    #[test]
    fn test_convert_and_info() {
        let dir = tempfile::tempdir().unwrap();
        let ron_path = dir.path().join("crypt.ron");
        let json_path = dir.path().join("crypt.json");
        let catalog = RoomNodeTypeList::dungeon_defaults();
        save_graph(&sample_graph(&catalog), &ron_path).unwrap();

        convert(&ron_path, &json_path, None).unwrap();
        assert!(std::fs::read_to_string(&json_path).unwrap().trim_start().starts_with('{'));

        let mut out = Vec::new();
        info(&json_path, None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Crypt\n"));
        assert!(text.contains("Entrance"));
        assert!(text.contains("-> "));
        assert!(text.contains("(Boss Room)"));
    }

    #[test]
    fn test_print_default_catalog() {
        let mut out = Vec::new();
        print_catalog(None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().any(|line| line == "None (placeholder)"));
        assert!(text.lines().any(|line| line == "Boss Room"));
    }

    #[test]
    fn test_validate_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let result = validate(&dir.path().join("missing.ron"), None, &mut out);
        assert!(matches!(result, Err(ToolError::Asset(AssetError::Io(_)))));
    }
}
