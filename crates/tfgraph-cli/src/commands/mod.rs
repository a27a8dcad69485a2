//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use tfgraph_graph::{GraphClient, GraphConfig};

pub mod graph;
pub mod ingest;
pub mod parse;

/// How long to wait for Neo4j to answer the connection ping.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Terraform graph ingestion into Neo4j
#[derive(Parser)]
#[command(name = "tfgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the Terraform configuration directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true, env = "TFGRAPH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate (or load) the graph and ingest it into Neo4j
    Ingest(ingest::IngestArgs),

    /// Parse a graph description and print a summary, without touching Neo4j
    Parse(parse::ParseArgs),

    /// Show stored resource and dependency counts
    Status,

    /// List stored resources and dependencies
    Verify,

    /// Show what a resource depends on (or what depends on it)
    Deps {
        /// Resource address, e.g. "aws_instance.web"
        name: String,
        /// Follow dependents instead of dependencies
        #[arg(long)]
        reverse: bool,
        /// Traversal depth
        #[arg(long, default_value = "1")]
        depth: u32,
    },

    /// Execute a Cypher query verbatim
    Query {
        /// Cypher query string
        cypher: String,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let project_dir = match self.project {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        match self.command {
            Commands::Ingest(args) => ingest::execute(args, &project_dir).await,
            Commands::Parse(args) => parse::execute(args, &project_dir),
            Commands::Status => graph::cmd_status().await,
            Commands::Verify => graph::cmd_verify().await,
            Commands::Deps { name, reverse, depth } => graph::cmd_deps(&name, reverse, depth).await,
            Commands::Query { cypher } => graph::cmd_query(&cypher).await,
        }
    }
}

/// Connect to Neo4j using the environment configuration.
pub async fn connect() -> Result<GraphClient> {
    let config = GraphConfig::from_env().context("Neo4j is not configured (see .env.example)")?;

    tokio::time::timeout(CONNECT_TIMEOUT, GraphClient::connect(&config))
        .await
        .with_context(|| format!("Timed out connecting to Neo4j at {}", config.uri))?
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.uri))
}

/// Resolve a path relative to the project directory.
pub fn resolve(project_dir: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}
