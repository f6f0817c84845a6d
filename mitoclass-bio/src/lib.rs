//! Sequence handling for mitoclass: FASTA I/O, trimming and filtering,
//! composition featurization, and per-pool summary statistics.

pub mod features;
pub mod filter;
pub mod formats;
pub mod sequence;

pub use features::{featurize, featurize_pool};
pub use filter::{filter_pool, trim, FilterOptions, FilterSummary};
pub use formats::fasta::{parse_fasta, parse_fasta_str, write_fasta};
pub use sequence::{FilteredSequence, PoolStats, SequenceRecord};
