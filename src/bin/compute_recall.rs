use anyhow::Context;
use ann_prep::GroundTruth;
use ann_prep::io::read_ids;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Scores ANN search results against ground-truth neighbors", long_about = None)]
struct Args {
    /// Retrieved neighbor ids, one row per query (`.npy` or `.u32bin`).
    #[clap(long, required = true)]
    results: String,

    /// Exact neighbor ids, one row per query (`.npy` or `.u32bin`).
    #[clap(long, required = true)]
    ground_truth: String,

    /// Number of neighbors to score. Defaults to the narrower of the two matrices.
    #[clap(long)]
    k: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let results = read_ids(args.results.as_str())
        .with_context(|| format!("Unable to read results from '{}'", args.results))?;
    let ground_truth = read_ids(args.ground_truth.as_str())
        .with_context(|| format!("Unable to read ground truth from '{}'", args.ground_truth))?;

    let ground_truth = GroundTruth::new(ground_truth);

    let recall = ground_truth.mean_recall(results.view(), args.k)?;
    println!("Recall: {} over {} queries", recall, ground_truth.num_queries());
    Ok(())
}
