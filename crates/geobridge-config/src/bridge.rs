//! Bridge Configuration (geobridge.toml)
//!
//! Everything here is consumed once, when the binding is loaded.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// WGS84 equatorial radius in meters
pub const WGS84_A: f64 = 6378137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257223563;

/// Geographic WGS84, as proj4 expands EPSG:4326
pub const WGS84_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Bridge configuration from geobridge.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Parameters of the default ellipsoid handle
    #[serde(default)]
    pub ellipsoid: EllipsoidConfig,

    /// Default projection handle
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Resource type registration policy
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Default ellipsoid parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EllipsoidConfig {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Default for EllipsoidConfig {
    fn default() -> Self {
        Self {
            a: WGS84_A,
            f: WGS84_F,
        }
    }
}

/// Default projection definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Definition string handed to the projection engine at load
    pub default_definition: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            default_definition: WGS84_DEFINITION.to_string(),
        }
    }
}

/// Resource type registration policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Take over resource types left registered by a previous load
    pub takeover: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { takeover: true }
    }
}

impl BridgeConfig {
    /// Load bridge configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: "<string>".into(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Only the configured defaults are checked here. Ellipsoids constructed
    /// at runtime are not range-checked.
    pub fn validate(&self) -> ConfigResult<()> {
        let EllipsoidConfig { a, f } = self.ellipsoid;

        if !a.is_finite() || a <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "ellipsoid.a".to_string(),
                reason: format!("semi-major axis must be a positive number, got {}", a),
            });
        }

        if !f.is_finite() || f >= 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "ellipsoid.f".to_string(),
                reason: format!("flattening must be less than 1, got {}", f),
            });
        }

        if self.projection.default_definition.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "projection.default_definition".to_string(),
                reason: "definition cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "<root>".to_string(),
            reason: e.to_string(),
        })
    }
}
