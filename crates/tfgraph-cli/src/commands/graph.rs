//! Read-side commands against the ingested graph.

use anyhow::Result;
use colored::Colorize;

use tfgraph_graph::queries::{dependencies, raw};
use tfgraph_graph::GraphStore;

use crate::output;

/// Show stored resource and dependency counts.
pub async fn cmd_status() -> Result<()> {
    let client = super::connect().await?;

    println!("{}", "Terraform Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  Neo4j:         {}", client.uri().cyan());
    output::print_counts(&client.counts().await?);

    Ok(())
}

/// List every stored resource and dependency.
pub async fn cmd_verify() -> Result<()> {
    let client = super::connect().await?;

    let counts = client.counts().await?;
    output::print_counts(&counts);

    let resources = dependencies::list_resources(&client).await?;
    output::print_resources(&resources);

    let deps = dependencies::list_dependencies(&client).await?;
    output::print_dependencies(&deps);

    println!("\n{}", "Verification complete.".green().bold());
    Ok(())
}

/// Show transitive dependencies or dependents of a resource.
pub async fn cmd_deps(name: &str, reverse: bool, depth: u32) -> Result<()> {
    let client = super::connect().await?;

    let (title, reached) = if reverse {
        ("Resources depending on", dependencies::dependents_of(&client, name, depth).await?)
    } else {
        ("Dependencies of", dependencies::dependencies_of(&client, name, depth).await?)
    };

    println!("{} {} (depth={})", title.bold(), name.cyan(), depth);
    println!("{}", "─".repeat(50));
    output::print_reached(&reached);

    Ok(())
}

/// Execute a raw Cypher query.
pub async fn cmd_query(cypher: &str) -> Result<()> {
    let client = super::connect().await?;
    let results = raw::raw_query(&client, cypher).await?;

    if results.is_empty() {
        println!("{}", "No results.".dimmed());
    } else {
        for (i, result) in results.iter().enumerate() {
            println!("{}: {}", (i + 1).to_string().dimmed(), result);
        }
    }

    Ok(())
}
