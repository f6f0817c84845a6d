use serde::{Deserialize, Serialize};

use crate::MitoclassError;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Named, ordered feature layout fixed at featurization time.
///
/// A schema is one or more k-mer blocks concatenated in the order given. Each
/// block enumerates all 4^k k-mers over {A,C,G,T} in lexicographic order, so
/// column order is identical across training and validation no matter which
/// k-mers actually occur. Selecting features by name through this schema
/// replaces positional column slicing everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    ks: Vec<usize>,
    offsets: Vec<usize>,
    names: Vec<String>,
}

impl FeatureSchema {
    /// Schema with a single k-mer block (4^k columns).
    pub fn single(k: usize) -> Self {
        Self::combined(&[k]).expect("single k-mer size is always a valid combination")
    }

    /// Schema concatenating one block per k-mer size, in the order given.
    pub fn combined(ks: &[usize]) -> Result<Self, MitoclassError> {
        if ks.is_empty() {
            return Err(MitoclassError::InvalidInput(
                "feature schema needs at least one k-mer size".to_string(),
            ));
        }
        for window in ks.windows(2) {
            if window[1] <= window[0] {
                return Err(MitoclassError::InvalidInput(format!(
                    "k-mer sizes must be strictly increasing, got {:?}",
                    ks
                )));
            }
        }
        if *ks.last().unwrap() > 12 {
            return Err(MitoclassError::InvalidInput(format!(
                "k-mer size {} out of supported range 1..=12",
                ks.last().unwrap()
            )));
        }
        if ks[0] == 0 {
            return Err(MitoclassError::InvalidInput(
                "k-mer size must be positive".to_string(),
            ));
        }

        let mut offsets = Vec::with_capacity(ks.len());
        let mut names = Vec::new();
        for &k in ks {
            offsets.push(names.len());
            let block = 4usize.pow(k as u32);
            for rank in 0..block {
                names.push(kmer_name(rank, k));
            }
        }

        Ok(Self {
            ks: ks.to_vec(),
            offsets,
            names,
        })
    }

    /// Total column count across all blocks.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn kmer_sizes(&self) -> &[usize] {
        &self.ks
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, column: usize) -> &str {
        &self.names[column]
    }

    /// (k, start column, block width) for each block.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.ks
            .iter()
            .zip(self.offsets.iter())
            .map(|(&k, &offset)| (k, offset, 4usize.pow(k as u32)))
    }

    /// Global column index of a k-mer window, or None if the window contains
    /// a byte outside {A,C,G,T} or its length matches no block.
    pub fn column_of(&self, window: &[u8]) -> Option<usize> {
        let block = self.ks.iter().position(|&k| k == window.len())?;
        let mut rank = 0usize;
        for &byte in window {
            rank = rank * 4 + base_code(byte)?;
        }
        Some(self.offsets[block] + rank)
    }
}

fn base_code(byte: u8) -> Option<usize> {
    match byte {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

fn kmer_name(rank: usize, k: usize) -> String {
    let mut bytes = vec![b'A'; k];
    let mut rest = rank;
    for slot in bytes.iter_mut().rev() {
        *slot = BASES[rest % 4];
        rest /= 4;
    }
    String::from_utf8(bytes).expect("k-mer names are ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mononucleotide_schema() {
        let schema = FeatureSchema::single(1);
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.names(), ["A", "C", "G", "T"]);
    }

    #[test]
    fn test_dinucleotide_order_is_lexicographic() {
        let schema = FeatureSchema::single(2);
        assert_eq!(schema.len(), 16);
        assert_eq!(schema.name(0), "AA");
        assert_eq!(schema.name(1), "AC");
        assert_eq!(schema.name(4), "CA");
        assert_eq!(schema.name(15), "TT");

        let mut sorted = schema.names().to_vec();
        sorted.sort();
        assert_eq!(sorted, schema.names());
    }

    #[test]
    fn test_combined_blocks() {
        let schema = FeatureSchema::combined(&[1, 2]).unwrap();
        assert_eq!(schema.len(), 20);
        let blocks: Vec<_> = schema.blocks().collect();
        assert_eq!(blocks, vec![(1, 0, 4), (2, 4, 16)]);
        assert_eq!(schema.name(4), "AA");
    }

    #[test]
    fn test_column_of() {
        let schema = FeatureSchema::combined(&[1, 2]).unwrap();
        assert_eq!(schema.column_of(b"A"), Some(0));
        assert_eq!(schema.column_of(b"T"), Some(3));
        assert_eq!(schema.column_of(b"AC"), Some(5));
        assert_eq!(schema.column_of(b"TT"), Some(19));
        assert_eq!(schema.column_of(b"NN"), None);
        assert_eq!(schema.column_of(b"ACG"), None);
    }

    #[test]
    fn test_rejects_bad_combinations() {
        assert!(FeatureSchema::combined(&[]).is_err());
        assert!(FeatureSchema::combined(&[2, 1]).is_err());
        assert!(FeatureSchema::combined(&[2, 2]).is_err());
        assert!(FeatureSchema::combined(&[0]).is_err());
        assert!(FeatureSchema::combined(&[13]).is_err());
    }
}
