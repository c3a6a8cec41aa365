use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
pub struct Main {
    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Convert resolved-type snapshots into a TypeSpec document.
    Convert(ConvertArgs),
}

#[derive(Debug, clap::Args)]
pub struct ConvertArgs {
    /// Snapshot files (`.json`, `.yaml`, or `.yml`), or directories to
    /// scan for them.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// The output file for the generated document.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Run `tsp compile` on the generated document.
    #[arg(long)]
    pub check: bool,
}
