//! Composition featurization: k-mer proportion profiles per sequence.

use crate::sequence::FilteredSequence;
use mitoclass_core::{FeatureSchema, FeatureVector, GeneLabel, MitoclassError, MitoclassResult};
use rayon::prelude::*;

/// Compute the composition profile of one sequence under a schema.
///
/// Every overlapping length-k window over {A,C,G,T} is counted and divided by
/// the number of counted windows, one block per schema k. Windows touching a
/// remaining ambiguous base are skipped, so each block still sums to one. A
/// sequence with no countable window for some block is an error.
pub fn featurize(
    seq: &FilteredSequence,
    label: GeneLabel,
    schema: &FeatureSchema,
) -> MitoclassResult<FeatureVector> {
    let mut values = vec![0.0f64; schema.len()];

    for (k, offset, width) in schema.blocks() {
        if seq.len() < k {
            return Err(MitoclassError::InvalidInput(format!(
                "sequence '{}' is shorter ({} bases) than k-mer size {}",
                seq.id,
                seq.len(),
                k
            )));
        }

        let mut counts = vec![0usize; width];
        let mut total = 0usize;
        for window in seq.sequence.windows(k) {
            if let Some(column) = schema.column_of(window) {
                counts[column - offset] += 1;
                total += 1;
            }
        }

        if total == 0 {
            return Err(MitoclassError::InvalidInput(format!(
                "sequence '{}' has no unambiguous {}-mer window",
                seq.id, k
            )));
        }

        for (i, count) in counts.into_iter().enumerate() {
            values[offset + i] = count as f64 / total as f64;
        }
    }

    Ok(FeatureVector::new(seq.id.clone(), label, values))
}

/// Featurize a whole pool under one label, in parallel. Output order matches
/// input order.
pub fn featurize_pool(
    pool: &[FilteredSequence],
    label: GeneLabel,
    schema: &FeatureSchema,
) -> MitoclassResult<Vec<FeatureVector>> {
    pool.par_iter()
        .map(|seq| featurize(seq, label, schema))
        .collect()
}
