//! Error types for the bridge
//!
//! Two failure channels reach the host:
//! - [`NifError`] is raised as an exception (bad argument, unknown function)
//! - [`NativeError`] is returned as a value, `{:error, message}`
//!
//! [`LoadError`] and [`RegistryError`] never reach a caller; they abort a
//! module load.

use geobridge_config::ConfigError;
use std::fmt;
use thiserror::Error;

/// Exception-level failure of a bridge function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NifError {
    /// Argument has the wrong shape or type
    #[error("argument error: {0}")]
    BadArg(String),

    /// No function with this name and arity is exported
    #[error("undefined function {module}.{name}/{arity}")]
    Undefined {
        module: String,
        name: String,
        arity: usize,
    },
}

impl NifError {
    pub fn badarg(msg: impl Into<String>) -> Self {
        NifError::BadArg(msg.into())
    }
}

pub type NifResult<T> = Result<T, NifError>;

/// Error codes reported by the projection engine
///
/// Codes and messages follow the classic proj.4 `pj_errno` table so that host
/// code matching on messages keeps working across engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjErrno {
    NoArgs,
    NoColonInInit,
    ProjNotNamed,
    UnknownProjectionId,
    UnknownUnit,
    UnknownEllipsoid,
    MajorAxisNotGiven,
    LatLongExceeded,
    InvalidXY,
    NonConvergentInverseMeridional,
    NonConvergentInversePhi2,
    ToleranceCondition,
    ConicLatEqual,
    EllipticalRequired,
    InvalidUtmZone,
    DatumShiftFile,
    Unparseable,
    GeocentricMissingZ,
    IllegalAxis,
    OutsideShiftGrid,
}

impl ProjErrno {
    /// Every known code, in table order
    pub const ALL: [ProjErrno; 20] = [
        ProjErrno::NoArgs,
        ProjErrno::NoColonInInit,
        ProjErrno::ProjNotNamed,
        ProjErrno::UnknownProjectionId,
        ProjErrno::UnknownUnit,
        ProjErrno::UnknownEllipsoid,
        ProjErrno::MajorAxisNotGiven,
        ProjErrno::LatLongExceeded,
        ProjErrno::InvalidXY,
        ProjErrno::NonConvergentInverseMeridional,
        ProjErrno::NonConvergentInversePhi2,
        ProjErrno::ToleranceCondition,
        ProjErrno::ConicLatEqual,
        ProjErrno::EllipticalRequired,
        ProjErrno::InvalidUtmZone,
        ProjErrno::DatumShiftFile,
        ProjErrno::Unparseable,
        ProjErrno::GeocentricMissingZ,
        ProjErrno::IllegalAxis,
        ProjErrno::OutsideShiftGrid,
    ];

    /// Numeric code (always negative)
    pub fn code(self) -> i32 {
        match self {
            ProjErrno::NoArgs => -1,
            ProjErrno::NoColonInInit => -3,
            ProjErrno::ProjNotNamed => -4,
            ProjErrno::UnknownProjectionId => -5,
            ProjErrno::UnknownUnit => -7,
            ProjErrno::UnknownEllipsoid => -9,
            ProjErrno::MajorAxisNotGiven => -13,
            ProjErrno::LatLongExceeded => -14,
            ProjErrno::InvalidXY => -15,
            ProjErrno::NonConvergentInverseMeridional => -17,
            ProjErrno::NonConvergentInversePhi2 => -18,
            ProjErrno::ToleranceCondition => -20,
            ProjErrno::ConicLatEqual => -21,
            ProjErrno::EllipticalRequired => -34,
            ProjErrno::InvalidUtmZone => -35,
            ProjErrno::DatumShiftFile => -38,
            ProjErrno::Unparseable => -44,
            ProjErrno::GeocentricMissingZ => -45,
            ProjErrno::IllegalAxis => -47,
            ProjErrno::OutsideShiftGrid => -48,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|errno| errno.code() == code)
    }

    /// Human-readable message for the code
    pub fn message(self) -> &'static str {
        match self {
            ProjErrno::NoArgs => "no arguments in initialization list",
            ProjErrno::NoColonInInit => "no colon in init= string",
            ProjErrno::ProjNotNamed => "projection not named",
            ProjErrno::UnknownProjectionId => "unknown projection id",
            ProjErrno::UnknownUnit => "unknown unit conversion id",
            ProjErrno::UnknownEllipsoid => "unknown elliptical parameter name",
            ProjErrno::MajorAxisNotGiven => "major axis or radius = 0 or not given",
            ProjErrno::LatLongExceeded => "latitude or longitude exceeded limits",
            ProjErrno::InvalidXY => "invalid x or y",
            ProjErrno::NonConvergentInverseMeridional => {
                "non-convergent inverse meridional dist"
            }
            ProjErrno::NonConvergentInversePhi2 => "non-convergent inverse phi2",
            ProjErrno::ToleranceCondition => "tolerance condition error",
            ProjErrno::ConicLatEqual => "conic lat_1 = -lat_2",
            ProjErrno::EllipticalRequired => "elliptical usage required",
            ProjErrno::InvalidUtmZone => "invalid UTM zone number",
            ProjErrno::DatumShiftFile => "failed to load datum shift file",
            ProjErrno::Unparseable => "unparseable coordinate system definition",
            ProjErrno::GeocentricMissingZ => "geocentric transformation missing z or ellps",
            ProjErrno::IllegalAxis => "illegal axis orientation combination",
            ProjErrno::OutsideShiftGrid => "point not within available datum shift grids",
        }
    }
}

impl fmt::Display for ProjErrno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Value-level failure from a native engine
///
/// The host sees only the errno message. `detail` carries the engine's own
/// description and is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{errno}")]
pub struct NativeError {
    pub errno: ProjErrno,
    pub detail: Option<String>,
}

impl NativeError {
    pub fn new(errno: ProjErrno) -> Self {
        Self {
            errno,
            detail: None,
        }
    }

    pub fn with_detail(errno: ProjErrno, detail: impl Into<String>) -> Self {
        Self {
            errno,
            detail: Some(detail.into()),
        }
    }

    /// Message handed back to the host
    pub fn message(&self) -> &'static str {
        self.errno.message()
    }
}

/// Failure to open or take over a resource type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("resource type '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("resource type '{0}' is not registered, nothing to take over")]
    NotRegistered(String),
}

/// Failure of module load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open resource type: {0}")]
    Registration(#[from] RegistryError),

    #[error("default projection '{definition}' could not be created: {source}")]
    DefaultProjection {
        definition: String,
        #[source]
        source: NativeError,
    },

    #[error("invalid bridge configuration: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_errno_codes_are_unique_and_negative() {
        let codes: HashSet<i32> = ProjErrno::ALL.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), ProjErrno::ALL.len());
        assert!(codes.iter().all(|&code| code < 0));
    }

    #[test]
    fn test_errno_from_code() {
        assert_eq!(ProjErrno::from_code(-4), Some(ProjErrno::ProjNotNamed));
        assert_eq!(ProjErrno::from_code(-44), Some(ProjErrno::Unparseable));
        assert_eq!(ProjErrno::from_code(0), None);
        assert_eq!(ProjErrno::from_code(-2), None);
    }

    #[test]
    fn test_native_error_displays_errno_message() {
        let err = NativeError::with_detail(ProjErrno::UnknownProjectionId, "foo");
        assert_eq!(err.to_string(), "unknown projection id");
        assert_eq!(err.message(), "unknown projection id");
    }

    #[test]
    fn test_undefined_message() {
        let err = NifError::Undefined {
            module: "proj".to_string(),
            name: "nope".to_string(),
            arity: 2,
        };
        assert_eq!(err.to_string(), "undefined function proj.nope/2");
    }
}
