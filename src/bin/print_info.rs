use anyhow::Context;
use clap::Parser;
use ann_prep::Hdf5Source;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to an hdf5 file containing the data.
    #[clap(long, required = true)]
    path: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let source = Hdf5Source::open(args.path.as_str())
        .with_context(|| format!("Unable to open '{}'", args.path))?;
    println!("{}", source);
    Ok(())
}
