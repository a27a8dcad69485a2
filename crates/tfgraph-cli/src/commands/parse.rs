//! `tfgraph parse`: inspect a graph description without a database.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use tfgraph_core::{cache, load_graph, ParseOptions};

use crate::output;

#[derive(Args)]
pub struct ParseArgs {
    /// DOT, Graphviz JSON or cache file to parse
    pub input: PathBuf,

    /// Write the normalized graph cache here
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Fail on edges that reference undeclared resources
    #[arg(long)]
    pub no_implicit_nodes: bool,

    /// Print the normalized graph as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ParseArgs, project_dir: &Path) -> Result<()> {
    let input = super::resolve(project_dir, &args.input);
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let options = ParseOptions {
        implicit_nodes: !args.no_implicit_nodes,
    };
    let loaded = load_graph(&content, &options)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    let graph = loaded.graph;

    if args.json {
        println!("{}", graph.to_json()?);
    } else {
        println!("{} {} ({})", "Parsed".bold(), input.display(), loaded.format.as_str().dimmed());
        if let Some(metadata) = &loaded.graphviz {
            output::print_graphviz_metadata(metadata);
        }
        output::print_summary(&graph.summary());
    }

    if let Some(out) = args.output {
        let out = super::resolve(project_dir, &out);
        cache::save_cache(&graph, &out)
            .with_context(|| format!("Failed to write graph cache {}", out.display()))?;
        println!("{} {}", "Graph cached at".dimmed(), out.display());
    }

    Ok(())
}
