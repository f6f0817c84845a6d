use serde::{Deserialize, Serialize};

use super::GeneLabel;

/// Per-sequence composition profile: one proportion per schema column.
///
/// Values within each k-mer block are probabilities summing to one. The
/// ordering is owned by the [`super::FeatureSchema`] the vector was produced
/// under; a vector is only meaningful together with its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub source_id: String,
    pub label: GeneLabel,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(source_id: String, label: GeneLabel, values: Vec<f64>) -> Self {
        Self {
            source_id,
            label,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }
}
