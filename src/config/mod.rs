//! Configuration management for zipline
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. `ZIPLINE__*` entries of a `.env` file in the working directory
//! 4. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use zipline::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Remote fetch limit: {}", config.fetch.max_concurrent);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ZIPLINE__<section>__<key>`
//!
//! Examples:
//! - `ZIPLINE__FETCH__MAX_CONCURRENT=10`
//! - `ZIPLINE__FETCH__MIN_INTERVAL=500ms`
//! - `ZIPLINE__DOCUMENT__COMMENT_PREFIX=#`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `zipline.toml` in the working
//! directory. This can be overridden using the `ZIPLINE_CONFIG` environment
//! variable or the `--config` flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, DocumentConfig, FetchConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`ZIPLINE__*`)
    /// 2. `.env` file
    /// 3. TOML file (default: `zipline.toml`)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path, still layering `.env` and environment
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-check invariants, e.g. after command-line overrides were applied
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[fetch]\nmax_concurrent = 1\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.fetch.max_concurrent, 1);
        assert_eq!(config.document.directive_marker, ".");
    }

    #[test]
    fn test_validation_runs_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[document]
comment_prefix = "."
directive_marker = ".."
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::MarkerShadowedByComment { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[fetch]\nmin_interval = \"soon\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::LoadError(_)));
    }
}
