use serde::{Deserialize, Serialize};
use std::fmt;

/// Gene of origin for a sequence. The pipeline is a binary classification
/// problem over the two mitochondrial gene pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneLabel {
    Coi,
    Cytb,
}

impl GeneLabel {
    pub const ALL: [GeneLabel; 2] = [GeneLabel::Coi, GeneLabel::Cytb];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneLabel::Coi => "COI",
            GeneLabel::Cytb => "CytB",
        }
    }

    /// Index used for label vectors and confusion-matrix cells.
    pub fn index(&self) -> usize {
        match self {
            GeneLabel::Coi => 0,
            GeneLabel::Cytb => 1,
        }
    }

}

impl fmt::Display for GeneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
