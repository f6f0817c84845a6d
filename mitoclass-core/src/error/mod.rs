//! Core error types for mitoclass

use thiserror::Error;

/// Main error type for mitoclass operations
///
/// Every variant is fatal to the run that raised it; there are no retries
/// anywhere in the pipeline. Variants carry enough context (gene name, stage,
/// counts) to diagnose a failed run without re-running it.
#[derive(Error, Debug)]
pub enum MitoclassError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FASTA parse error in {path}: {detail}")]
    Parse { path: String, detail: String },

    #[error("no sequences survived the {stage} filter for {gene} ({input} in, {survivors} out)")]
    FilterExhaustion {
        gene: String,
        stage: String,
        input: usize,
        survivors: usize,
    },

    #[error("insufficient data for {gene}: pool holds {pool} vectors, split requested {requested}")]
    InsufficientData {
        gene: String,
        pool: usize,
        requested: usize,
    },

    #[error("{model} did not converge: {detail}")]
    Convergence { model: String, detail: String },

    #[error("feature width mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for mitoclass operations
pub type MitoclassResult<T> = Result<T, MitoclassError>;

impl From<serde_json::Error> for MitoclassError {
    fn from(err: serde_json::Error) -> Self {
        MitoclassError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MitoclassError {
    fn from(err: toml::de::Error) -> Self {
        MitoclassError::Configuration(err.to_string())
    }
}
