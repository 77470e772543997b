use anyhow::Context;
use ann_prep::{convert_with, plan_artifacts, ConvertOptions, Hdf5Source};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Converts an ann-benchmarks HDF5 file into npy and flat binary artifacts", long_about = None)]
struct Args {
    /// Path to an hdf5 file with `train`, `test`, and `neighbors` datasets.
    #[clap(long, required = true)]
    path: String,

    /// Scale train and test vectors to unit L2 norm.
    #[clap(long)]
    normalize: bool,

    /// Also write `fbin`, `u8bin`, and `u32bin` artifacts.
    #[clap(long)]
    flat: bool,
}

/// creates a progress bar with the default template
pub fn create_progress(name: &str, delta_refresh: usize, elems: usize) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(elems as u64);
    pb.set_draw_delta(delta_refresh as u64);
    let rest = "[{elapsed_precise}] [{bar:40.cyan/blue}] ({pos}/{len}, ETA {eta})";
    pb.set_style(indicatif::ProgressStyle::default_bar().template(&format!("{}: {}", name, rest)));
    pb
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = ConvertOptions { normalize: args.normalize, flat: args.flat };

    let source = Hdf5Source::open(args.path.as_str())
        .with_context(|| format!("Unable to open '{}'", args.path))?;

    let pb = create_progress("Writing artifacts", 1, plan_artifacts(args.path.as_str(), &options).len());
    let report = convert_with(&source, args.path.as_str(), &options, |_| pb.inc(1))
        .with_context(|| format!("Unable to convert '{}'", args.path))?;
    pb.finish_and_clear();

    println!("{}", report);
    Ok(())
}
