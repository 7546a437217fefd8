use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pmi_neighbors::{fingerprint, snapshot, NeighborConfig, NeighborEngine, PairwiseCounter};

#[derive(Parser, Debug)]
#[command(name = "pmi-neighbors", about = "Top-K PMI co-occurrence neighbors")]
struct Cli {
    /// Pairwise counter snapshot (JSON)
    #[arg(long)]
    counts: PathBuf,
    /// Output path for the neighbor mapping (JSON)
    #[arg(long)]
    output: PathBuf,
    /// Neighbor sweep config (JSON); flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Neighbors kept per key
    #[arg(long)]
    top_k: Option<usize>,
    /// Parallel partitions (1 = sequential)
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    let mut config = match &cli.config {
        Some(path) => NeighborConfig::from_json_file(path)?,
        None => NeighborConfig::default(),
    };
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    let counter = PairwiseCounter::from_snapshot(snapshot::load_counts(&cli.counts)?)?;
    tracing::info!(
        path = %cli.counts.display(),
        keys = counter.store().keys().len(),
        nnz = counter.store().nnz(),
        "Loaded pairwise counter"
    );

    let engine = NeighborEngine::new(&counter, config)?;
    let neighbors = engine.compute_all()?;

    snapshot::save_neighbors(&neighbors, &cli.output)?;
    tracing::info!(
        path = %cli.output.display(),
        keys = neighbors.len(),
        digest = %fingerprint::neighbors_digest_hex(&neighbors),
        "Wrote neighbors"
    );

    println!("program running time: {:.3} seconds", start.elapsed().as_secs_f64());
    Ok(())
}
