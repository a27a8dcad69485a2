//! `tfgraph ingest`: terraform graph -> cache -> Neo4j.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use tfgraph_core::{cache, load_graph, parse_dot_with, Graph, ParseOptions};
use tfgraph_graph::{GraphStore, GraphWriter, IngestOptions, MemoryStore};

use crate::output;

#[derive(Args)]
pub struct IngestArgs {
    /// Graph cache file, written after generation or read with --skip-generate
    #[arg(long, default_value = "graph.json")]
    pub graph_file: PathBuf,

    /// Do not run `terraform graph`; read --graph-file instead
    #[arg(long)]
    pub skip_generate: bool,

    /// Keep existing resources in Neo4j and merge into them
    #[arg(long)]
    pub no_clear: bool,

    /// Abort on the first record that fails to write
    #[arg(long)]
    pub strict: bool,

    /// Ingest into an in-memory store instead of Neo4j
    #[arg(long)]
    pub dry_run: bool,

    /// Fail on edges that reference undeclared resources
    #[arg(long)]
    pub no_implicit_nodes: bool,
}

pub async fn execute(args: IngestArgs, project_dir: &Path) -> Result<()> {
    let options = ParseOptions {
        implicit_nodes: !args.no_implicit_nodes,
    };
    let graph_file = super::resolve(project_dir, &args.graph_file);

    let graph = if args.skip_generate {
        read_graph(&graph_file, &options)?
    } else {
        let graph = generate_graph(project_dir, &options)?;
        cache::save_cache(&graph, &graph_file)
            .with_context(|| format!("Failed to write graph cache {}", graph_file.display()))?;
        println!("{} {}", "Graph cached at".dimmed(), graph_file.display());
        graph
    };

    output::print_summary(&graph.summary());

    let ingest_options = IngestOptions { clear: !args.no_clear };

    if args.dry_run {
        let store = MemoryStore::new();
        println!("\n{}", "Dry run: ingesting into memory".bold());
        run_ingest(&store, &graph, &ingest_options, args.strict).await?;
        println!("  Statements:    {}", store.statement_count().to_string().cyan());
        return Ok(());
    }

    let client = super::connect().await?;
    println!("\n{} {}", "Ingesting into".bold(), client.uri().cyan());
    run_ingest(&client, &graph, &ingest_options, args.strict).await?;

    println!("\n{}", "Terraform graph ingested into Neo4j.".green().bold());
    println!(
        "  Example query: {}",
        "MATCH (s:TerraformResource)-[d:DEPENDS_ON]->(t) RETURN s, d, t LIMIT 25".dimmed()
    );
    Ok(())
}

async fn run_ingest<S: GraphStore + ?Sized>(
    store: &S,
    graph: &Graph,
    options: &IngestOptions,
    strict: bool,
) -> Result<()> {
    let report = GraphWriter::new(store)
        .strict(strict)
        .ingest(graph, options)
        .await
        .context("Graph ingestion failed")?;
    output::print_ingest_report(&report);

    let counts = store.counts().await.context("Failed to read database statistics")?;
    output::print_counts(&counts);
    Ok(())
}

/// Load a previously written graph file (cache, Graphviz JSON or DOT).
fn read_graph(path: &Path, options: &ParseOptions) -> Result<Graph> {
    if !path.exists() {
        bail!("Graph file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let loaded = load_graph(&content, options)
        .with_context(|| format!("Failed to parse graph file {}", path.display()))?;
    if let Some(metadata) = &loaded.graphviz {
        output::print_graphviz_metadata(metadata);
    }

    let graph = loaded.graph;
    info!(
        path = %path.display(),
        format = loaded.format.as_str(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Graph loaded"
    );
    Ok(graph)
}

/// Run `terraform graph` in the project directory and parse its DOT output.
fn generate_graph(project_dir: &Path, options: &ParseOptions) -> Result<Graph> {
    println!("{}", "Generating Terraform graph...".bold());

    let output = Command::new("terraform")
        .arg("graph")
        .current_dir(project_dir)
        .output()
        .context("Failed to run 'terraform graph'. Is Terraform installed?")?;

    if !output.status.success() {
        bail!(
            "terraform graph failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let dot = String::from_utf8(output.stdout).context("terraform graph printed non UTF-8 output")?;
    let graph = parse_dot_with(&dot, options).context("Failed to parse terraform graph output")?;

    info!(nodes = graph.node_count(), edges = graph.edge_count(), "Terraform graph generated");
    Ok(graph)
}
