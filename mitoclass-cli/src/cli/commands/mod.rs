pub mod run;
pub mod stats;
pub mod sweep;

use mitoclass_core::{MitoclassResult, PipelineConfig};
use std::path::Path;

/// Load the TOML config (or defaults) and apply the CLI seed override.
pub fn load_config(
    path: Option<&Path>,
    seed_override: Option<u64>,
) -> MitoclassResult<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = seed_override {
        config.split.seed = seed;
    }
    Ok(config)
}
