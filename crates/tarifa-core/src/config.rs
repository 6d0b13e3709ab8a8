//! Engine configuration
//!
//! This module provides centralized configuration management using the
//! `config` crate. Configuration can be loaded from environment variables
//! and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Rating engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RatingConfig {
    /// Cap on activation-window discovery iterations per rate.
    ///
    /// A rate whose schedule produces more activation windows than this
    /// within a single usage period aborts the computation.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Number of decimals the final cost is rounded to (banker's rounding)
    #[serde(default = "default_rounding_decimals")]
    pub rounding_decimals: u32,
}

fn default_max_iterations() -> usize {
    1000
}

fn default_rounding_decimals() -> u32 {
    5
}

impl RatingConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("max_iterations", 1000)?
            .set_default("rounding_decimals", 5)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with TARIFA_ prefix
            .add_source(
                Environment::with_prefix("TARIFA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("TARIFA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            rounding_decimals: default_rounding_decimals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RatingConfig::default();
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.rounding_decimals, 5);
    }
}
