//! Validation-set evaluation: predictions, confusion matrices, and
//! per-feature importance tables.

use crate::dataset::FeatureMatrix;
use mitoclass_core::{FeatureSchema, GeneLabel, MitoclassError, MitoclassResult};
use serde::{Deserialize, Serialize};

/// Seam between the trainers and the evaluator. Both model families expose
/// the same prediction and importance surface so they can be tabulated
/// identically.
pub trait Classifier {
    fn name(&self) -> &'static str;

    fn schema(&self) -> &FeatureSchema;

    /// Predict a label per row. Fails with `ShapeMismatch` when the matrix
    /// width differs from the schema the model was fitted under; a malformed
    /// matrix is fatal to the evaluation call, never silently skipped.
    fn predict(&self, matrix: &FeatureMatrix) -> MitoclassResult<Vec<GeneLabel>>;

    fn importance(&self) -> ImportanceTable;
}

/// Shared width guard for `Classifier::predict` implementations.
pub(crate) fn check_width(schema: &FeatureSchema, matrix: &FeatureMatrix) -> MitoclassResult<()> {
    if matrix.n_cols() != schema.len() {
        return Err(MitoclassError::ShapeMismatch {
            expected: schema.len(),
            actual: matrix.n_cols(),
        });
    }
    Ok(())
}

/// Counts per (observed, predicted) label pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_pairs(
        observed: &[GeneLabel],
        predicted: &[GeneLabel],
    ) -> MitoclassResult<Self> {
        if observed.len() != predicted.len() {
            return Err(MitoclassError::ShapeMismatch {
                expected: observed.len(),
                actual: predicted.len(),
            });
        }
        let mut counts = [[0usize; 2]; 2];
        for (obs, pred) in observed.iter().zip(predicted.iter()) {
            counts[obs.index()][pred.index()] += 1;
        }
        Ok(Self { counts })
    }

    pub fn count(&self, observed: GeneLabel, predicted: GeneLabel) -> usize {
        self.counts[observed.index()][predicted.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        self.counts[0][0] + self.counts[1][1]
    }

    pub fn off_diagonal(&self) -> usize {
        self.total() - self.correct()
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.correct() as f64 / self.total() as f64
        }
    }
}

/// One feature's importance under a fitted model. The per-class columns are
/// populated by the forest only; the linear model has a single magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceRow {
    pub feature: String,
    pub score: f64,
    pub per_class: Option<[f64; 2]>,
}

/// Feature importances for one model, sorted by descending score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceTable {
    pub model: String,
    pub rows: Vec<ImportanceRow>,
}

impl ImportanceTable {
    pub fn new(model: &str, mut rows: Vec<ImportanceRow>) -> Self {
        rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            model: model.to_string(),
            rows,
        }
    }

    pub fn top(&self, n: usize) -> &[ImportanceRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitoclass_core::GeneLabel::{Coi, Cytb};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_perfect_classifier_has_empty_off_diagonal() {
        // Balanced 2-class, 500-item validation set.
        let mut observed = vec![Coi; 250];
        observed.extend(vec![Cytb; 250]);
        let predicted = observed.clone();

        let matrix = ConfusionMatrix::from_pairs(&observed, &predicted).unwrap();
        assert_eq!(matrix.total(), 500);
        assert_eq!(matrix.off_diagonal(), 0);
        assert_eq!(matrix.count(Coi, Coi), 250);
        assert_eq!(matrix.count(Cytb, Cytb), 250);
        assert_eq!(matrix.accuracy(), 1.0);
    }

    #[test]
    fn test_mixed_predictions() {
        let observed = vec![Coi, Coi, Cytb, Cytb, Cytb];
        let predicted = vec![Coi, Cytb, Cytb, Cytb, Coi];
        let matrix = ConfusionMatrix::from_pairs(&observed, &predicted).unwrap();

        assert_eq!(matrix.count(Coi, Coi), 1);
        assert_eq!(matrix.count(Coi, Cytb), 1);
        assert_eq!(matrix.count(Cytb, Cytb), 2);
        assert_eq!(matrix.count(Cytb, Coi), 1);
        assert_eq!(matrix.off_diagonal(), 2);
        assert!((matrix.accuracy() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_is_shape_error() {
        let err = ConfusionMatrix::from_pairs(&[Coi, Coi], &[Coi]).unwrap_err();
        assert!(matches!(err, MitoclassError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_importance_table_sorted_descending() {
        let table = ImportanceTable::new(
            "test model",
            vec![
                ImportanceRow {
                    feature: "AA".to_string(),
                    score: 0.1,
                    per_class: None,
                },
                ImportanceRow {
                    feature: "GC".to_string(),
                    score: 0.9,
                    per_class: None,
                },
                ImportanceRow {
                    feature: "AT".to_string(),
                    score: 0.4,
                    per_class: None,
                },
            ],
        );

        let features: Vec<_> = table.rows.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(features, ["GC", "AT", "AA"]);
        assert_eq!(table.top(2).len(), 2);
        assert_eq!(table.top(10).len(), 3);
    }
}
