//! Orchestration of the classification run: featurize both filtered pools,
//! split per gene, fit both models on the identical training matrix, and
//! evaluate each against the validation labels independently.

use crate::dataset::{self, FeatureMatrix};
use crate::evaluate::{Classifier, ConfusionMatrix, ImportanceTable};
use crate::forest::{CvReport, RandomForest};
use crate::logistic::LogisticRegression;
use mitoclass_bio::features::featurize_pool;
use mitoclass_bio::sequence::FilteredSequence;
use mitoclass_core::{FeatureSchema, GeneLabel, MitoclassResult, PipelineConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub schema: FeatureSchema,
    pub cv: CvReport,
    pub train_rows: usize,
    pub valid_rows: usize,
    pub forest_confusion: ConfusionMatrix,
    pub logistic_confusion: ConfusionMatrix,
    pub forest_importance: ImportanceTable,
    pub logistic_importance: ImportanceTable,
    pub forest_fit_secs: f64,
    pub logistic_fit_secs: f64,
}

/// Train and evaluate both classifiers on the given filtered pools under one
/// schema. Both fits see the same training matrix, the same column order,
/// and RNG streams derived from the one configured seed.
pub fn classify_pools(
    coi: &[FilteredSequence],
    cytb: &[FilteredSequence],
    schema: &FeatureSchema,
    config: &PipelineConfig,
) -> MitoclassResult<ClassificationOutcome> {
    let coi_vectors = featurize_pool(coi, GeneLabel::Coi, schema)?;
    let cytb_vectors = featurize_pool(cytb, GeneLabel::Cytb, schema)?;

    let mut rng = StdRng::seed_from_u64(config.split.seed);
    let coi_split = dataset::split(
        "COI",
        &coi_vectors,
        config.split.train_count,
        config.split.valid_count,
        &mut rng,
    )?;
    let cytb_split = dataset::split(
        "CytB",
        &cytb_vectors,
        config.split.train_count,
        config.split.valid_count,
        &mut rng,
    )?;

    let mut train = coi_split.train;
    train.extend(cytb_split.train);
    let mut valid = coi_split.valid;
    valid.extend(cytb_split.valid);

    let train_matrix = FeatureMatrix::from_vectors(schema, &train)?;
    let valid_matrix = FeatureMatrix::from_vectors(schema, &valid)?;

    tracing::info!(
        k = ?schema.kmer_sizes(),
        columns = schema.len(),
        train_rows = train_matrix.n_rows(),
        valid_rows = valid_matrix.n_rows(),
        "fitting classifiers"
    );

    let started = Instant::now();
    let (forest, cv) = RandomForest::fit(&train_matrix, &config.forest, config.split.seed)?;
    let forest_fit_secs = started.elapsed().as_secs_f64();
    let forest_predictions = forest.predict(&valid_matrix)?;
    let forest_confusion = ConfusionMatrix::from_pairs(&valid_matrix.labels, &forest_predictions)?;

    let started = Instant::now();
    let logistic = LogisticRegression::fit(&train_matrix, &config.logistic)?;
    let logistic_fit_secs = started.elapsed().as_secs_f64();
    let logistic_predictions = logistic.predict(&valid_matrix)?;
    let logistic_confusion =
        ConfusionMatrix::from_pairs(&valid_matrix.labels, &logistic_predictions)?;

    Ok(ClassificationOutcome {
        schema: schema.clone(),
        cv,
        train_rows: train_matrix.n_rows(),
        valid_rows: valid_matrix.n_rows(),
        forest_importance: forest.importance(),
        logistic_importance: logistic.importance(),
        forest_confusion,
        logistic_confusion,
        forest_fit_secs,
        logistic_fit_secs,
    })
}
