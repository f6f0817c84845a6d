pub mod stats;
pub mod types;

pub use stats::PoolStats;
pub use types::{FilteredSequence, SequenceRecord};
