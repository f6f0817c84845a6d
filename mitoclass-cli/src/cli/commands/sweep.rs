use crate::cli::SweepArgs;
use crate::report::sweep_table;
use mitoclass_bio::filter::{filter_pool, FilterOptions};
use mitoclass_bio::formats::fasta::parse_fasta;
use mitoclass_ml::{load_sweep_table, render_sweep_csv, run_sweep};

pub fn run(args: SweepArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref(), None)?;

    let rows = match &args.precomputed {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading precomputed sweep table");
            load_sweep_table(path)?
        }
        None => {
            // clap guarantees both paths are present when --precomputed is not.
            let coi_path = args
                .coi
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--coi is required without --precomputed"))?;
            let cytb_path = args
                .cytb
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--cytb is required without --precomputed"))?;
            let options = FilterOptions::from(&config.filter);

            let coi_records = parse_fasta(coi_path)?;
            let cytb_records = parse_fasta(cytb_path)?;
            let (coi_pool, _) = filter_pool("COI", &coi_records, &options)?;
            let (cytb_pool, _) = filter_pool("CytB", &cytb_records, &options)?;

            run_sweep(&coi_pool, &cytb_pool, &config)?
        }
    };

    println!("{}", sweep_table(&rows));

    if let Some(path) = &args.output {
        std::fs::write(path, render_sweep_csv(&rows))?;
        println!("\nSweep table written to {}", path.display());
    }

    Ok(())
}
