//! Terminal output formatting.

use colored::Colorize;

use tfgraph_core::graphviz::GraphvizMetadata;
use tfgraph_core::GraphSummary;
use tfgraph_graph::queries::dependencies::{DependencyRow, ReachedResource, ResourceRow};
use tfgraph_graph::{GraphCounts, IngestReport};

/// How many root/leaf names to show before eliding.
const NAME_PREVIEW: usize = 5;

/// Print a parsed graph summary.
pub fn print_summary(summary: &GraphSummary) {
    println!("  Resources:     {}", summary.nodes.to_string().cyan());
    println!("  Dependencies:  {}", summary.edges.to_string().cyan());

    if summary.nodes == 0 {
        println!("  {}", "Graph is empty.".dimmed());
        return;
    }

    println!("  Roots:         {}", preview(&summary.roots));
    println!("  Leaves:        {}", preview(&summary.leaves));
}

/// Print the graph-level attributes of a Graphviz JSON document.
pub fn print_graphviz_metadata(metadata: &GraphvizMetadata) {
    println!("  Graph name:    {}", metadata.name.cyan());
    println!("  Directed:      {}", metadata.directed);
    println!("  Strict:        {}", metadata.strict);
}

/// Print the outcome of an ingest.
pub fn print_ingest_report(report: &IngestReport) {
    if report.cleared {
        println!("  {} existing resources cleared", "✓".green());
    }
    if report.constraint_ensured {
        println!("  {} name constraint ensured", "✓".green());
    } else {
        println!("  {} name constraint not created", "!".yellow());
    }
    println!(
        "  {} {} resources written{}",
        "✓".green(),
        report.nodes.written,
        skipped_suffix(report.nodes.skipped)
    );
    println!(
        "  {} {} dependencies written{}",
        "✓".green(),
        report.relationships.written,
        skipped_suffix(report.relationships.skipped)
    );
}

/// Print stored counts.
pub fn print_counts(counts: &GraphCounts) {
    println!("  Nodes:         {}", counts.nodes.to_string().cyan());
    println!("  Relationships: {}", counts.relationships.to_string().cyan());
}

pub fn print_resources(resources: &[ResourceRow]) {
    println!("\n{}", "Resources".bold());
    if resources.is_empty() {
        println!("  {}", "No resources found.".dimmed());
        return;
    }
    for r in resources {
        println!("  {} {} {}", "•".dimmed(), r.name, format!("(id: {})", r.id).dimmed());
    }
}

pub fn print_dependencies(deps: &[DependencyRow]) {
    println!("\n{}", "Dependencies".bold());
    if deps.is_empty() {
        println!("  {}", "No dependencies found.".dimmed());
        return;
    }
    for d in deps {
        println!("  {} {} {}", d.from, "→".dimmed(), d.to);
    }
}

pub fn print_reached(reached: &[ReachedResource]) {
    if reached.is_empty() {
        println!("{}", "No related resources found.".dimmed());
        return;
    }
    for r in reached {
        println!(
            "  {} {} {}",
            "→".repeat(r.depth.max(1) as usize).dimmed(),
            r.name,
            format!("[{}]", r.label).dimmed()
        );
    }
    println!("\n{} related resources found.", reached.len().to_string().bold());
}

fn skipped_suffix(skipped: usize) -> String {
    if skipped == 0 {
        String::new()
    } else {
        format!(" ({} skipped)", skipped).yellow().to_string()
    }
}

fn preview(names: &[String]) -> String {
    if names.is_empty() {
        return "-".dimmed().to_string();
    }
    let shown: Vec<&str> = names.iter().take(NAME_PREVIEW).map(String::as_str).collect();
    if names.len() > NAME_PREVIEW {
        format!("{} (+{} more)", shown.join(", "), names.len() - NAME_PREVIEW)
    } else {
        shown.join(", ")
    }
}
