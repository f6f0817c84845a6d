use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;
mod report;

use crate::cli::{Cli, Commands};
use mitoclass_core::MitoclassError;

fn main() {
    // Initialize logging with MITOCLASS_LOG environment variable support
    let log_level = std::env::var("MITOCLASS_LOG").unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<MitoclassError>() {
            Some(MitoclassError::Configuration(_)) => 2,
            Some(MitoclassError::Io(_)) => 3,
            Some(MitoclassError::Parse { .. }) => 4,
            Some(MitoclassError::FilterExhaustion { .. })
            | Some(MitoclassError::InsufficientData { .. }) => 5,
            Some(MitoclassError::Convergence { .. }) => 6,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // 0 lets rayon size the pool from the machine.
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .expect("Failed to initialize thread pool");

    match cli.command {
        Commands::Run(args) => crate::cli::commands::run::run(args),
        Commands::Stats(args) => crate::cli::commands::stats::run(args),
        Commands::Sweep(args) => crate::cli::commands::sweep::run(args),
    }
}
