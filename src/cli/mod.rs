//! CLI module for hierdisc.
//!
//! Subcommands:
//! - `children`: List the children of a node
//! - `walk`: Drive a filter chain down from an assembly
//! - `booths`: Sweep for every booth below a node
//! - `permissions`: Map a permissions file to level assignments

mod booths;
mod children;
mod permissions;
mod walk;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;

use crate::config::Config;
use crate::context::Context;
use crate::models::NodeId;

pub use permissions::load_assignments;

/// hierdisc - administrative hierarchy discovery
#[derive(Parser)]
#[command(name = "hierdisc")]
#[command(about = "Explore an administrative hierarchy API: children, filter chains, booths")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the children of a node
    Children {
        /// Node id to list
        node: NodeId,

        /// Fetch only this page (1-based) instead of every page
        #[arg(long)]
        page: Option<u32>,
    },

    /// Walk a filter chain from an assembly down towards booths
    Walk {
        /// Assembly node id to start from
        assembly: NodeId,

        /// Node ids to pick at each tier, in order (first child when omitted)
        #[arg(long = "pick", value_delimiter = ',')]
        picks: Vec<NodeId>,
    },

    /// Find every booth below a node
    Booths {
        /// Node id to sweep from
        node: NodeId,
    },

    /// Map a permissions JSON file to level assignments
    Permissions {
        /// Path to the permissions JSON file
        path: PathBuf,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Children { node, page } => self.run_children(node, page).await,
            Command::Walk {
                assembly,
                ref picks,
            } => self.run_walk(assembly, picks).await,
            Command::Booths { node } => self.run_booths(node).await,
            Command::Permissions { ref path } => self.run_permissions(path),
        }
    }

    /// Load configuration and build a context against the HTTP API.
    fn context(&self) -> Result<Context> {
        let config = Config::load()?;
        tracing::info!("Using hierarchy API at {}", config.api.base_url);
        Ok(Context::connect(config)?)
    }
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
