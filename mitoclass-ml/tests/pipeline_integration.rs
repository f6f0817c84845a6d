//! End-to-end training/evaluation runs on synthetic pools with distinct
//! composition biases.

use mitoclass_bio::sequence::FilteredSequence;
use mitoclass_core::{FeatureSchema, MitoclassError, PipelineConfig};
use mitoclass_ml::{classify_pools, run_sweep};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic pool biased toward the given base weights (A, C, G, T).
fn biased_pool(prefix: &str, count: usize, len: usize, weights: [u32; 4], seed: u64) -> Vec<FilteredSequence> {
    let mut rng = StdRng::seed_from_u64(seed);
    let total: u32 = weights.iter().sum();
    (0..count)
        .map(|i| {
            let sequence: Vec<u8> = (0..len)
                .map(|_| {
                    let roll = rng.gen_range(0..total);
                    let mut acc = 0;
                    for (base, &w) in [b'A', b'C', b'G', b'T'].iter().zip(weights.iter()) {
                        acc += w;
                        if roll < acc {
                            return *base;
                        }
                    }
                    b'T'
                })
                .collect();
            FilteredSequence {
                id: format!("{}{}", prefix, i),
                sequence,
            }
        })
        .collect()
}

fn small_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.split.train_count = 40;
    config.split.valid_count = 10;
    config.split.seed = 42;
    config.forest.n_trees = 15;
    config.forest.cv_folds = 2;
    config.forest.mtry_grid = vec![1, 2];
    config.sweep.kmer_sizes = vec![1, 2];
    config
}

fn pools() -> (Vec<FilteredSequence>, Vec<FilteredSequence>) {
    // Strong composition difference: AC-rich versus GT-rich.
    let coi = biased_pool("coi", 60, 300, [5, 4, 2, 1], 11);
    let cytb = biased_pool("cytb", 60, 300, [1, 2, 4, 5], 22);
    (coi, cytb)
}

#[test]
fn test_classification_run_separates_biased_pools() {
    let (coi, cytb) = pools();
    let schema = FeatureSchema::combined(&[1, 2]).unwrap();
    let config = small_config();

    let outcome = classify_pools(&coi, &cytb, &schema, &config).unwrap();

    assert_eq!(outcome.train_rows, 80);
    assert_eq!(outcome.valid_rows, 20);
    assert_eq!(outcome.forest_confusion.total(), 20);
    assert_eq!(outcome.logistic_confusion.total(), 20);
    assert!(outcome.forest_confusion.accuracy() >= 0.9);
    assert!(outcome.logistic_confusion.accuracy() >= 0.9);

    // Importance tables cover the full schema for both models.
    assert_eq!(outcome.forest_importance.rows.len(), 20);
    assert_eq!(outcome.logistic_importance.rows.len(), 20);
}

#[test]
fn test_run_is_reproducible_per_seed() {
    let (coi, cytb) = pools();
    let schema = FeatureSchema::single(2);
    let config = small_config();

    let a = classify_pools(&coi, &cytb, &schema, &config).unwrap();
    let b = classify_pools(&coi, &cytb, &schema, &config).unwrap();

    assert_eq!(a.forest_confusion, b.forest_confusion);
    assert_eq!(a.logistic_confusion, b.logistic_confusion);
    assert_eq!(a.cv.chosen_mtry, b.cv.chosen_mtry);
}

#[test]
fn test_insufficient_pool_aborts_run() {
    let (coi, cytb) = pools();
    let schema = FeatureSchema::single(1);
    let mut config = small_config();
    config.split.train_count = 55;
    config.split.valid_count = 10;

    let err = classify_pools(&coi, &cytb, &schema, &config).unwrap_err();
    assert!(matches!(err, MitoclassError::InsufficientData { .. }));
}

#[test]
fn test_sweep_produces_one_row_per_k_and_model() {
    let (coi, cytb) = pools();
    let config = small_config();

    let rows = run_sweep(&coi, &cytb, &config).unwrap();
    assert_eq!(rows.len(), 4);

    for &k in &config.sweep.kmer_sizes {
        let models: Vec<&str> = rows
            .iter()
            .filter(|r| r.k == k)
            .map(|r| r.model.as_str())
            .collect();
        assert_eq!(models, ["random forest", "logistic regression"]);
    }
    for row in &rows {
        assert!((0.0..=1.0).contains(&row.accuracy));
        assert!(row.elapsed_secs >= 0.0);
    }
}
