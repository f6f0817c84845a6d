use crate::cli::RunArgs;
use crate::report::{
    composition_table, confusion_table, importance_table, pool_table, PoolReport, RunReport,
};
use mitoclass_bio::filter::{filter_pool, FilterOptions};
use mitoclass_bio::formats::fasta::parse_fasta;
use mitoclass_bio::sequence::PoolStats;
use mitoclass_core::FeatureSchema;
use mitoclass_ml::classify_pools;

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref(), args.seed)?;
    let options = FilterOptions::from(&config.filter);

    let coi_records = parse_fasta(&args.coi)?;
    let cytb_records = parse_fasta(&args.cytb)?;

    let (coi_pool, coi_summary) = filter_pool("COI", &coi_records, &options)?;
    let (cytb_pool, cytb_summary) = filter_pool("CytB", &cytb_records, &options)?;

    let pools = vec![
        PoolReport {
            gene: "COI".to_string(),
            stats: PoolStats::calculate(&coi_pool),
            filter: coi_summary,
        },
        PoolReport {
            gene: "CytB".to_string(),
            stats: PoolStats::calculate(&cytb_pool),
            filter: cytb_summary,
        },
    ];

    let schema = FeatureSchema::combined(&config.features.kmer_sizes)?;
    let outcome = classify_pools(&coi_pool, &cytb_pool, &schema, &config)?;

    println!("Filtering");
    println!("{}", pool_table(&pools));
    println!("\nBase composition");
    println!("{}", composition_table(&pools));

    println!(
        "\nCross-validation: {} folds, chosen mtry = {}",
        outcome.cv.folds, outcome.cv.chosen_mtry
    );
    println!(
        "\nRandom forest  accuracy {:.4}  fit {:.2}s",
        outcome.forest_confusion.accuracy(),
        outcome.forest_fit_secs
    );
    println!("{}", confusion_table(&outcome.forest_confusion));
    println!("{}", importance_table(&outcome.forest_importance, args.top));

    println!(
        "\nLogistic regression  accuracy {:.4}  fit {:.2}s",
        outcome.logistic_confusion.accuracy(),
        outcome.logistic_fit_secs
    );
    println!("{}", confusion_table(&outcome.logistic_confusion));
    println!(
        "{}",
        importance_table(&outcome.logistic_importance, args.top)
    );

    if let Some(path) = &args.output {
        let report = RunReport::new(config, pools, &outcome);
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}
