//! Shared value types threaded through the pipeline

mod label;
mod schema;
mod vector;

pub use label::GeneLabel;
pub use schema::FeatureSchema;
pub use vector::FeatureVector;
