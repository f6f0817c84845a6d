//! Core types, configuration, and error taxonomy for mitoclass.

pub mod config;
pub mod error;
pub mod types;

pub use config::PipelineConfig;
pub use error::{MitoclassError, MitoclassResult};
pub use types::{FeatureSchema, FeatureVector, GeneLabel};
