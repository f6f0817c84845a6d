use super::types::FilteredSequence;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary statistics for one gene's filtered pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_sequences: usize,
    pub total_length: usize,
    pub average_length: f64,
    pub median_length: f64,
    pub min_length: usize,
    pub max_length: usize,

    /// Proportion of each base (A/C/G/T/N) over all retained bases.
    pub base_composition: HashMap<char, f64>,
    pub gc_content: f64,
    pub ambiguous_bases: usize,
}

impl PoolStats {
    pub fn calculate(pool: &[FilteredSequence]) -> Self {
        if pool.is_empty() {
            return Self::empty();
        }

        let mut lengths: Vec<usize> = pool.iter().map(|s| s.len()).collect();
        lengths.sort_unstable();
        let total_length: usize = lengths.iter().sum();

        let mid = lengths.len() / 2;
        let median_length = if lengths.len() % 2 == 1 {
            lengths[mid] as f64
        } else {
            (lengths[mid - 1] + lengths[mid]) as f64 / 2.0
        };

        let mut base_counts: HashMap<u8, usize> = HashMap::new();
        for seq in pool {
            for &base in &seq.sequence {
                *base_counts.entry(base).or_insert(0) += 1;
            }
        }

        let mut base_composition = HashMap::new();
        for base in [b'A', b'C', b'G', b'T', b'N'] {
            let count = base_counts.get(&base).copied().unwrap_or(0);
            base_composition.insert(base as char, count as f64 / total_length as f64);
        }

        let gc = base_counts.get(&b'G').copied().unwrap_or(0)
            + base_counts.get(&b'C').copied().unwrap_or(0);
        let ambiguous_bases = base_counts.get(&b'N').copied().unwrap_or(0);

        Self {
            total_sequences: pool.len(),
            total_length,
            average_length: total_length as f64 / pool.len() as f64,
            median_length,
            min_length: lengths[0],
            max_length: *lengths.last().unwrap(),
            base_composition,
            gc_content: gc as f64 / total_length as f64,
            ambiguous_bases,
        }
    }

    fn empty() -> Self {
        Self {
            total_sequences: 0,
            total_length: 0,
            average_length: 0.0,
            median_length: 0.0,
            min_length: 0,
            max_length: 0,
            base_composition: HashMap::new(),
            gc_content: 0.0,
            ambiguous_bases: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(id: &str, bases: &[u8]) -> FilteredSequence {
        FilteredSequence {
            id: id.to_string(),
            sequence: bases.to_vec(),
        }
    }

    #[test]
    fn test_empty_pool() {
        let stats = PoolStats::calculate(&[]);
        assert_eq!(stats.total_sequences, 0);
        assert_eq!(stats.median_length, 0.0);
    }

    #[test]
    fn test_basic_stats() {
        let pool = vec![seq("a", b"ACGT"), seq("b", b"GGCCNA"), seq("c", b"AT")];
        let stats = PoolStats::calculate(&pool);

        assert_eq!(stats.total_sequences, 3);
        assert_eq!(stats.total_length, 12);
        assert_eq!(stats.median_length, 4.0);
        assert_eq!(stats.min_length, 2);
        assert_eq!(stats.max_length, 6);
        assert_eq!(stats.ambiguous_bases, 1);

        // 3 G + 3 C out of 12 bases.
        assert!((stats.gc_content - 0.5).abs() < 1e-12);
        assert!((stats.base_composition[&'A'] - 3.0 / 12.0).abs() < 1e-12);
        assert!((stats.base_composition[&'N'] - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_composition_sums_to_one_without_gaps() {
        let pool = vec![seq("a", b"ACGTN"), seq("b", b"TTTT")];
        let stats = PoolStats::calculate(&pool);
        let sum: f64 = stats.base_composition.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
