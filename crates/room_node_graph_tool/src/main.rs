// SPDX-License-Identifier: MIT OR Apache-2.0
//! `room_graph_tool` - headless companion for room node graph assets.
//!
//! Creates, validates, inspects and converts graph assets without opening
//! the editor.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "room_graph_tool", version, about = "Room node graph asset tool")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an empty graph asset
    New {
        /// Asset path (.ron or .json)
        path: PathBuf,
        /// Graph name
        #[arg(long, default_value = "Room Node Graph")]
        name: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load an asset and check its connections
    Validate {
        /// Asset path
        path: PathBuf,
        /// Room type catalog (RON); built-in dungeon types when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List the nodes of an asset
    Info {
        /// Asset path
        path: PathBuf,
        /// Room type catalog (RON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print the room type catalog
    Catalog {
        /// Room type catalog (RON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Re-encode an asset, RON and JSON chosen by extension
    Convert {
        /// Source asset
        input: PathBuf,
        /// Destination asset
        output: PathBuf,
        /// Room type catalog (RON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "room_node_graph=debug,room_node_graph_tool=debug"
    } else {
        "room_node_graph=info,room_node_graph_tool=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Command::New { path, name, force } => commands::new_graph(&path, &name, force),
        Command::Validate { path, catalog } => commands::validate(&path, catalog.as_deref(), &mut stdout),
        Command::Info { path, catalog } => commands::info(&path, catalog.as_deref(), &mut stdout),
        Command::Catalog { catalog } => commands::print_catalog(catalog.as_deref(), &mut stdout),
        Command::Convert { input, output, catalog } => commands::convert(&input, &output, catalog.as_deref()),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
