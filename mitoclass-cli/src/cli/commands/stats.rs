use crate::cli::StatsArgs;
use crate::report::{composition_table, pool_table, PoolReport};
use mitoclass_bio::filter::{filter_pool, FilterOptions};
use mitoclass_bio::formats::fasta::parse_fasta;
use mitoclass_bio::sequence::PoolStats;

pub fn run(args: StatsArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref(), None)?;
    let options = FilterOptions::from(&config.filter);

    let mut pools = Vec::new();
    for (gene, path) in [("COI", &args.coi), ("CytB", &args.cytb)] {
        let records = parse_fasta(path)?;
        let (pool, summary) = filter_pool(gene, &records, &options)?;
        pools.push(PoolReport {
            gene: gene.to_string(),
            stats: PoolStats::calculate(&pool),
            filter: summary,
        });
    }

    println!("Filtering");
    println!("{}", pool_table(&pools));
    println!("\nBase composition");
    println!("{}", composition_table(&pools));

    for pool in &pools {
        println!(
            "\n{}: {} sequences, lengths {}..{} (median {:.1}, mean {:.1})",
            pool.gene,
            pool.stats.total_sequences,
            pool.stats.min_length,
            pool.stats.max_length,
            pool.stats.median_length,
            pool.stats.average_length
        );
    }

    Ok(())
}
