//! Geobridge Configuration System
//!
//! Provides configuration for the binding's load-time state:
//! - The default ellipsoid parameters (WGS84 unless overridden)
//! - The default projection definition
//! - Resource type registration policy
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults (WGS84)
//! 2. Project config (./geobridge.toml, searched upwards)
//! 3. Environment variables (GEOBRIDGE_*)
//!
//! # Example
//!
//! ```no_run
//! use geobridge_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! assert!(config.ellipsoid.a > 0.0);
//! ```

pub mod bridge;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use bridge::{BridgeConfig, EllipsoidConfig, ProjectionConfig, RegistryConfig};
pub use loader::ConfigLoader;
