//! Configuration types for the mitoclass pipeline

use crate::MitoclassError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub forest: ForestConfig,
    #[serde(default)]
    pub logistic: LogisticConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Maximum tolerated fraction of ambiguous (`N`) bases, measured on the
    /// trimmed sequence for both gene pools.
    #[serde(default = "default_max_n_fraction")]
    pub max_n_fraction: f64,
    /// Half-width of the retained length window around the per-gene median.
    #[serde(default = "default_length_window")]
    pub length_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// k-mer sizes concatenated into the classification feature profile.
    /// Each size contributes a block of 4^k proportions summing to one.
    #[serde(default = "default_kmer_sizes")]
    pub kmer_sizes: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_train_count")]
    pub train_count: usize,
    #[serde(default = "default_valid_count")]
    pub valid_count: usize,
    /// Master seed for every stochastic step in the run.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    /// Candidate values for the features-per-split parameter. Empty means
    /// derive a grid around sqrt(feature count).
    #[serde(default)]
    pub mtry_grid: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Small L2 penalty on standardized coefficients. Composition blocks sum
    /// to one, so the unpenalized normal equations are rank deficient.
    #[serde(default = "default_ridge")]
    pub ridge: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// k-mer sizes measured by the training-time sweep, one schema per k.
    #[serde(default = "default_sweep_kmer_sizes")]
    pub kmer_sizes: Vec<usize>,
}

// Default value functions
fn default_max_n_fraction() -> f64 {
    0.01
}
fn default_length_window() -> usize {
    100
}
fn default_kmer_sizes() -> Vec<usize> {
    vec![1, 2]
}
fn default_train_count() -> usize {
    950
}
fn default_valid_count() -> usize {
    250
}
fn default_seed() -> u64 {
    42
}
fn default_n_trees() -> usize {
    200
}
fn default_min_samples_leaf() -> usize {
    1
}
fn default_max_depth() -> Option<usize> {
    None
}
fn default_cv_folds() -> usize {
    10
}
fn default_max_iter() -> usize {
    25
}
fn default_tolerance() -> f64 {
    1e-8
}
fn default_ridge() -> f64 {
    1e-6
}
fn default_sweep_kmer_sizes() -> Vec<usize> {
    vec![1, 2, 3, 4]
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_n_fraction: default_max_n_fraction(),
            length_window: default_length_window(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            kmer_sizes: default_kmer_sizes(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_count: default_train_count(),
            valid_count: default_valid_count(),
            seed: default_seed(),
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            min_samples_leaf: default_min_samples_leaf(),
            max_depth: default_max_depth(),
            cv_folds: default_cv_folds(),
            mtry_grid: Vec::new(),
        }
    }
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            ridge: default_ridge(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            kmer_sizes: default_sweep_kmer_sizes(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file. Missing sections and fields
    /// fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, MitoclassError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MitoclassError> {
        if !(0.0..=1.0).contains(&self.filter.max_n_fraction) {
            return Err(MitoclassError::Configuration(format!(
                "filter.max_n_fraction must lie in [0, 1], got {}",
                self.filter.max_n_fraction
            )));
        }
        if self.features.kmer_sizes.is_empty() {
            return Err(MitoclassError::Configuration(
                "features.kmer_sizes must not be empty".to_string(),
            ));
        }
        for &k in self
            .features
            .kmer_sizes
            .iter()
            .chain(self.sweep.kmer_sizes.iter())
        {
            if k == 0 || k > 12 {
                return Err(MitoclassError::Configuration(format!(
                    "k-mer size {} out of supported range 1..=12",
                    k
                )));
            }
        }
        if self.split.train_count == 0 || self.split.valid_count == 0 {
            return Err(MitoclassError::Configuration(
                "split counts must be positive".to_string(),
            ));
        }
        if self.forest.n_trees == 0 {
            return Err(MitoclassError::Configuration(
                "forest.n_trees must be positive".to_string(),
            ));
        }
        if self.forest.cv_folds < 2 {
            return Err(MitoclassError::Configuration(
                "forest.cv_folds must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.filter.max_n_fraction, 0.01);
        assert_eq!(config.filter.length_window, 100);
        assert_eq!(config.features.kmer_sizes, vec![1, 2]);
        assert_eq!(config.split.train_count, 950);
        assert_eq!(config.split.valid_count, 250);
        assert_eq!(config.forest.cv_folds, 10);
        assert_eq!(config.sweep.kmer_sizes, vec![1, 2, 3, 4]);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
            [filter]
            length_window = 50

            [split]
            seed = 7
        "#;
        let config: PipelineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.filter.length_window, 50);
        assert_eq!(config.filter.max_n_fraction, 0.01);
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.train_count, 950);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.filter.max_n_fraction = 1.5;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.kmer_sizes = vec![0];
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.forest.cv_folds = 1;
        assert!(config.validate().is_err());
    }
}
