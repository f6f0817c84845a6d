//! Labeled feature matrices and the seeded train/validation splitter.

use mitoclass_core::{FeatureSchema, FeatureVector, GeneLabel, MitoclassError, MitoclassResult};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;

/// A feature matrix bound to its schema: rows are sequences, columns follow
/// the schema's canonical ordering exactly.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub schema: FeatureSchema,
    pub ids: Vec<String>,
    pub labels: Vec<GeneLabel>,
    pub x: Array2<f64>,
}

impl FeatureMatrix {
    pub fn from_vectors(
        schema: &FeatureSchema,
        vectors: &[FeatureVector],
    ) -> MitoclassResult<Self> {
        let width = schema.len();
        let mut x = Array2::zeros((vectors.len(), width));
        let mut ids = Vec::with_capacity(vectors.len());
        let mut labels = Vec::with_capacity(vectors.len());

        for (row, vector) in vectors.iter().enumerate() {
            if vector.width() != width {
                return Err(MitoclassError::ShapeMismatch {
                    expected: width,
                    actual: vector.width(),
                });
            }
            for (col, &value) in vector.values.iter().enumerate() {
                x[[row, col]] = value;
            }
            ids.push(vector.source_id.clone());
            labels.push(vector.label);
        }

        Ok(Self {
            schema: schema.clone(),
            ids,
            labels,
            x,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.x.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.x.row(index)
    }

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut x = Array2::zeros((rows.len(), self.n_cols()));
        let mut ids = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for (out, &row) in rows.iter().enumerate() {
            x.row_mut(out).assign(&self.x.row(row));
            ids.push(self.ids[row].clone());
            labels.push(self.labels[row]);
        }
        Self {
            schema: self.schema.clone(),
            ids,
            labels,
            x,
        }
    }

    /// Per-class row counts, indexed by `GeneLabel::index`.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }
}

/// Disjoint training/validation draw from one class's pool.
#[derive(Debug, Clone)]
pub struct SplitPool {
    pub train: Vec<FeatureVector>,
    pub valid: Vec<FeatureVector>,
}

/// Draw `valid_count` vectors without replacement for validation, then
/// `train_count` from the remainder for training. The two sets are disjoint
/// by construction and the draw is a pure function of the RNG state.
pub fn split(
    gene: &str,
    pool: &[FeatureVector],
    train_count: usize,
    valid_count: usize,
    rng: &mut StdRng,
) -> MitoclassResult<SplitPool> {
    let requested = train_count + valid_count;
    if pool.len() < requested {
        return Err(MitoclassError::InsufficientData {
            gene: gene.to_string(),
            pool: pool.len(),
            requested,
        });
    }

    let valid_indices: Vec<usize> = index::sample(rng, pool.len(), valid_count).into_vec();
    let mut taken = vec![false; pool.len()];
    for &i in &valid_indices {
        taken[i] = true;
    }

    let remainder: Vec<usize> = (0..pool.len()).filter(|&i| !taken[i]).collect();
    let train_indices: Vec<usize> = index::sample(rng, remainder.len(), train_count)
        .into_iter()
        .map(|i| remainder[i])
        .collect();

    Ok(SplitPool {
        train: train_indices.iter().map(|&i| pool[i].clone()).collect(),
        valid: valid_indices.iter().map(|&i| pool[i].clone()).collect(),
    })
}
