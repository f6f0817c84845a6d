//! Trimming and filtering of raw sequence pools.
//!
//! Three pure passes, applied to each gene's pool independently:
//!
//! 1. Trim: remove alignment gaps (`-`) everywhere, then strip the leading
//!    and trailing runs of ambiguous bases (`N`).
//! 2. Quality: drop sequences whose remaining `N` fraction exceeds the
//!    threshold. Numerator and denominator are both taken from the trimmed
//!    sequence, identically for both gene pools.
//! 3. Length window: drop sequences whose trimmed length falls outside
//!    `[median - W, median + W]`, where the median is computed once over the
//!    whole quality-filtered pool before any sequence is dropped.
//!
//! Each pass takes an input collection and returns a new one; nothing is
//! mutated in place, so results depend only on the pool and the thresholds.

use crate::sequence::{FilteredSequence, SequenceRecord};
use mitoclass_core::config::FilterConfig;
use mitoclass_core::{MitoclassError, MitoclassResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    pub max_n_fraction: f64,
    pub length_window: usize,
}

impl From<&FilterConfig> for FilterOptions {
    fn from(config: &FilterConfig) -> Self {
        Self {
            max_n_fraction: config.max_n_fraction,
            length_window: config.length_window,
        }
    }
}

/// Per-pool accounting for the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSummary {
    pub gene: String,
    pub input: usize,
    pub dropped_by_quality: usize,
    pub dropped_by_length: usize,
    pub median_length: f64,
    pub survivors: usize,
}

/// Trim a single record: gaps out, ambiguous edges stripped. Idempotent.
pub fn trim(record: &SequenceRecord) -> FilteredSequence {
    let degapped: Vec<u8> = record
        .sequence
        .iter()
        .copied()
        .filter(|&b| b != b'-')
        .collect();

    let start = degapped
        .iter()
        .position(|&b| b != b'N')
        .unwrap_or(degapped.len());
    let end = degapped
        .iter()
        .rposition(|&b| b != b'N')
        .map(|i| i + 1)
        .unwrap_or(start);

    FilteredSequence {
        id: record.id.clone(),
        sequence: degapped[start..end].to_vec(),
    }
}

/// Run all three passes over one gene's pool.
pub fn filter_pool(
    gene: &str,
    records: &[SequenceRecord],
    options: &FilterOptions,
) -> MitoclassResult<(Vec<FilteredSequence>, FilterSummary)> {
    let trimmed: Vec<FilteredSequence> = records.iter().map(trim).collect();

    // Quality pass. Sequences trimmed down to nothing cannot be scored and
    // are dropped here as well.
    let quality_pass: Vec<FilteredSequence> = trimmed
        .into_iter()
        .filter(|seq| !seq.is_empty() && seq.n_fraction() <= options.max_n_fraction)
        .collect();
    let dropped_by_quality = records.len() - quality_pass.len();

    if quality_pass.is_empty() {
        return Err(MitoclassError::FilterExhaustion {
            gene: gene.to_string(),
            stage: "quality".to_string(),
            input: records.len(),
            survivors: 0,
        });
    }

    // The median must come from the full quality-filtered pool, so the
    // window pass only starts once every trimmed length is known.
    let median = median_length(&quality_pass);
    let window = options.length_window as f64;
    let retained: Vec<FilteredSequence> = quality_pass
        .iter()
        .filter(|seq| (seq.len() as f64 - median).abs() <= window)
        .cloned()
        .collect();
    let dropped_by_length = quality_pass.len() - retained.len();

    if retained.is_empty() {
        return Err(MitoclassError::FilterExhaustion {
            gene: gene.to_string(),
            stage: "length-window".to_string(),
            input: records.len(),
            survivors: 0,
        });
    }

    let summary = FilterSummary {
        gene: gene.to_string(),
        input: records.len(),
        dropped_by_quality,
        dropped_by_length,
        median_length: median,
        survivors: retained.len(),
    };

    tracing::info!(
        gene,
        input = summary.input,
        dropped_by_quality,
        dropped_by_length,
        median = median,
        survivors = summary.survivors,
        "filtered sequence pool"
    );

    Ok((retained, summary))
}

fn median_length(pool: &[FilteredSequence]) -> f64 {
    let mut lengths: Vec<usize> = pool.iter().map(|s| s.len()).collect();
    lengths.sort_unstable();
    let mid = lengths.len() / 2;
    if lengths.len() % 2 == 1 {
        lengths[mid] as f64
    } else {
        (lengths[mid - 1] + lengths[mid]) as f64 / 2.0
    }
}
