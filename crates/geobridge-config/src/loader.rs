//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::bridge::BridgeConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "geobridge.toml";

/// Environment override for the default ellipsoid semi-major axis
pub const ENV_ELLIPSOID_A: &str = "GEOBRIDGE_ELLIPSOID_A";

/// Environment override for the default ellipsoid flattening
pub const ENV_ELLIPSOID_F: &str = "GEOBRIDGE_ELLIPSOID_F";

/// Environment override for the default projection definition
pub const ENV_DEFAULT_PROJECTION: &str = "GEOBRIDGE_DEFAULT_PROJECTION";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Project config (./geobridge.toml) - overrides defaults
/// 3. Environment variables (GEOBRIDGE_*) - overrides project
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip GEOBRIDGE_* variables (hosts that forbid ambient env access)
    ignore_env: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Create a loader that does not read environment overrides
    pub fn without_env() -> Self {
        Self { ignore_env: true }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find geobridge.toml. Missing files are
    /// not an error; the built-in defaults are used instead.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<BridgeConfig> {
        let config = match Self::find_config_file(start_dir) {
            Some(path) => BridgeConfig::load_from_file(&path)?,
            None => BridgeConfig::default(),
        };

        self.finish(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<BridgeConfig> {
        let config = BridgeConfig::load_from_file(config_path)?;
        self.finish(config)
    }

    /// Built-in defaults plus environment overrides
    pub fn load_defaults(&self) -> ConfigResult<BridgeConfig> {
        self.finish(BridgeConfig::default())
    }

    fn finish(&self, config: BridgeConfig) -> ConfigResult<BridgeConfig> {
        let config = if self.ignore_env {
            config
        } else {
            apply_env_overrides(config)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Find geobridge.toml by walking up the directory tree
    fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return None,
            }
        }
    }
}

fn apply_env_overrides(mut config: BridgeConfig) -> ConfigResult<BridgeConfig> {
    if let Ok(a) = env::var(ENV_ELLIPSOID_A) {
        config.ellipsoid.a = parse_env_number(ENV_ELLIPSOID_A, &a)?;
    }

    if let Ok(f) = env::var(ENV_ELLIPSOID_F) {
        config.ellipsoid.f = parse_env_number(ENV_ELLIPSOID_F, &f)?;
    }

    if let Ok(definition) = env::var(ENV_DEFAULT_PROJECTION) {
        config.projection.default_definition = definition;
    }

    Ok(config)
}

fn parse_env_number(var: &str, raw: &str) -> ConfigResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidValue {
            field: var.to_string(),
            reason: format!("'{}' is not a number: {}", raw, e),
        })
}
