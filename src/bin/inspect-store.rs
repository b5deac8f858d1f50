use anyhow::{Context, Result};
use clap::Parser;
use molecule_dataset::*;
use std::path::PathBuf;

/// Summarizes a graph store written by prep-data, or renders one entry.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the store CSV file.
    store: PathBuf,

    /// Print the Graphviz DOT rendering of this entry instead of a summary.
    key: Option<String>,
}

/// Smallest, mean and largest of a non-empty list of counts.
fn spread(counts: &[usize]) -> Option<(usize, f64, usize)> {
    let min = *counts.iter().min()?;
    let max = *counts.iter().max()?;
    let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    Some((min, mean, max))
}

fn main() -> Result<()> {
    init_logging("warn");
    let cli = Cli::parse();
    let entries = read_csv_store(&cli.store)
        .with_context(|| format!("Failed to read store {}", cli.store.display()))?;

    if let Some(key) = cli.key {
        let graph = entries
            .get(&key)
            .with_context(|| format!("No entry '{key}' in {}", cli.store.display()))?;
        print!("{}", to_dot(graph));
        return Ok(());
    }

    println!("{}: {} entries", cli.store.display(), entries.len());
    let nodes: Vec<usize> = entries.values().map(MolecularGraph::node_count).collect();
    let edges: Vec<usize> = entries.values().map(MolecularGraph::edge_count).collect();
    for (label, counts) in [("nodes", nodes), ("edges", edges)] {
        if let Some((min, mean, max)) = spread(&counts) {
            println!("{label}: min {min}, mean {mean:.1}, max {max}");
        }
    }
    Ok(())
}
