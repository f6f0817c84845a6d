pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mitoclass",
    version,
    about = "Classify rodent mitochondrial genes (COI vs CytB) from k-mer composition"
)]
pub struct Cli {
    /// Worker threads for featurization and tree fitting (0 = all cores)
    #[arg(long, global = true, default_value_t = 0)]
    pub threads: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full pipeline: filter both pools, train both classifiers, evaluate
    Run(RunArgs),
    /// Per-gene summary statistics after filtering
    Stats(StatsArgs),
    /// Training-time scaling with k-mer size
    Sweep(SweepArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// FASTA file with the COI sequence pool (.gz accepted)
    #[arg(long, value_name = "FASTA")]
    pub coi: PathBuf,

    /// FASTA file with the CytB sequence pool (.gz accepted)
    #[arg(long, value_name = "FASTA")]
    pub cytb: PathBuf,

    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Override the configured master seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the full run report as JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Importance rows to display per model
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(clap::Args)]
pub struct StatsArgs {
    /// FASTA file with the COI sequence pool
    #[arg(long, value_name = "FASTA")]
    pub coi: PathBuf,

    /// FASTA file with the CytB sequence pool
    #[arg(long, value_name = "FASTA")]
    pub cytb: PathBuf,

    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct SweepArgs {
    /// FASTA file with the COI sequence pool
    #[arg(long, value_name = "FASTA", required_unless_present = "precomputed")]
    pub coi: Option<PathBuf>,

    /// FASTA file with the CytB sequence pool
    #[arg(long, value_name = "FASTA", required_unless_present = "precomputed")]
    pub cytb: Option<PathBuf>,

    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Load a precomputed sweep table (TSV) instead of re-running the sweep
    #[arg(long, value_name = "TSV", conflicts_with_all = ["coi", "cytb"])]
    pub precomputed: Option<PathBuf>,

    /// Write the sweep table as CSV
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
