use serde::{Deserialize, Serialize};

/// A raw nucleotide record as parsed from FASTA, immutable once loaded.
/// The alphabet is {A, C, G, T, N, '-'}; parsing upper-cases everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn header(&self) -> String {
        match &self.description {
            Some(desc) => format!(">{} {}", self.id, desc),
            None => format!(">{}", self.id),
        }
    }
}

/// A record that survived trimming and filtering. Gap characters are gone and
/// the edges carry no ambiguous bases; interior `N`s below the quality
/// threshold may remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredSequence {
    pub id: String,
    pub sequence: Vec<u8>,
}

impl FilteredSequence {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Count of remaining ambiguous bases.
    pub fn n_count(&self) -> usize {
        self.sequence.iter().filter(|&&b| b == b'N').count()
    }

    pub fn n_fraction(&self) -> f64 {
        if self.sequence.is_empty() {
            0.0
        } else {
            self.n_count() as f64 / self.sequence.len() as f64
        }
    }
}
