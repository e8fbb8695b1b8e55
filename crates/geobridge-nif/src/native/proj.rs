use crate::error::{NativeError, ProjErrno};
use proj4rs::errors::Error as EngineError;
use proj4rs::Proj;
use std::ffi::CStr;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Definition accepted as shorthand for geographic WGS84
const WGS84_SHORTHAND: &str = "WGS84";
const WGS84_EXPANSION: &str = "+proj=longlat +ellps=WGS84";

/// Prefixes of a definition that names an EPSG code, matched case-insensitively
const EPSG_PREFIXES: &[&str] = &["+init=epsg:", "epsg:"];

/// Per-handle error context
///
/// Records the errno of the last failed initialization made through it. A
/// context is owned by exactly one projection and freed after it.
#[derive(Debug)]
pub struct ProjContext {
    id: u64,
    errno: Option<ProjErrno>,
}

impl ProjContext {
    pub fn new() -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        trace!(ctx = id, "projection context allocated");
        Self { id, errno: None }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn errno(&self) -> Option<ProjErrno> {
        self.errno
    }

    fn fail(&mut self, error: NativeError) -> NativeError {
        self.errno = Some(error.errno);
        error
    }
}

impl Default for ProjContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProjContext {
    fn drop(&mut self) {
        trace!(ctx = self.id, "projection context freed");
    }
}

/// Initialized projection plus the definition it was built from
pub struct Pj {
    proj: Proj,
    definition: String,
}

impl Pj {
    /// Parse `definition` and initialize a projection under `ctx`
    pub fn init(ctx: &mut ProjContext, definition: &CStr) -> Result<Pj, NativeError> {
        let text = definition.to_str().map_err(|e| {
            ctx.fail(NativeError::with_detail(ProjErrno::Unparseable, e.to_string()))
        })?;

        let definition = canonical_definition(text);
        if definition.is_empty() {
            return Err(ctx.fail(NativeError::new(ProjErrno::NoArgs)));
        }

        let source = if definition.eq_ignore_ascii_case(WGS84_SHORTHAND) {
            WGS84_EXPANSION
        } else {
            definition.as_str()
        };

        let parsed = match epsg_code(source) {
            Some(code) => code
                .parse::<u16>()
                .map_err(|_| EngineError::ProjectionNotFound)
                .and_then(Proj::from_epsg_code),
            None => Proj::from_user_string(source),
        };
        let proj = parsed.map_err(|e| {
            ctx.fail(NativeError::with_detail(
                errno_for(&e, ProjErrno::Unparseable),
                e.to_string(),
            ))
        })?;

        trace!(ctx = ctx.id, projection = proj.projname(), "projection initialized");
        Ok(Pj {
            proj,
            definition: source.to_string(),
        })
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn is_latlong(&self) -> bool {
        self.proj.is_latlong()
    }

    /// Reproject one point from `src` to `dst`
    ///
    /// Geographic coordinates are in radians, as the engine takes them.
    pub fn transform(src: &Pj, dst: &Pj, point: (f64, f64, f64)) -> Result<(f64, f64, f64), NativeError> {
        let mut point = point;
        proj4rs::transform::transform(&src.proj, &dst.proj, &mut point).map_err(|e| {
            NativeError::with_detail(errno_for(&e, ProjErrno::LatLongExceeded), e.to_string())
        })?;
        Ok(point)
    }
}

impl fmt::Debug for Pj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pj")
            .field("definition", &self.definition)
            .finish()
    }
}

/// Whitespace-separated parameters, single-spaced
fn canonical_definition(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Code part of `+init=epsg:N` or `EPSG:N`
///
/// Only a definition that is nothing but the reference qualifies.
fn epsg_code(definition: &str) -> Option<&str> {
    if definition.contains(char::is_whitespace) {
        return None;
    }
    EPSG_PREFIXES.iter().find_map(|prefix| {
        let head = definition.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix)
            .then(|| &definition[prefix.len()..])
    })
}

/// Map an engine error onto the errno table
fn errno_for(error: &EngineError, fallback: ProjErrno) -> ProjErrno {
    match error {
        EngineError::MissingProjectionError => ProjErrno::ProjNotNamed,
        EngineError::ProjectionNotFound => ProjErrno::UnknownProjectionId,
        EngineError::InvalidDatum | EngineError::InvalidEllipsoid => ProjErrno::UnknownEllipsoid,
        EngineError::InputStringError(_)
        | EngineError::NoValueParameter(_)
        | EngineError::ParameterValueError(_)
        | EngineError::InvalidParameterValue(_)
        | EngineError::InvalidToWGS84String
        | EngineError::UnrecognizedFormat
        | EngineError::Utf8Error(_) => ProjErrno::Unparseable,
        EngineError::InvalidAxis => ProjErrno::IllegalAxis,
        EngineError::InvalidUtmZone => ProjErrno::InvalidUtmZone,
        EngineError::EllipsoidRequired => ProjErrno::EllipticalRequired,
        EngineError::ProjErrConicLatEqual => ProjErrno::ConicLatEqual,
        EngineError::LatitudeOutOfRange
        | EngineError::LatOrLongExceedLimit
        | EngineError::CoordinateOutOfRange
        | EngineError::CoordTransOutsideProjectionDomain => ProjErrno::LatLongExceeded,
        EngineError::NanCoordinateValue
        | EngineError::InvalidCoordinateDimension
        | EngineError::InvalidNumberOfCoordinates => ProjErrno::InvalidXY,
        EngineError::InvMeridDistConvError => ProjErrno::NonConvergentInverseMeridional,
        EngineError::NonInvPhi2Convergence => ProjErrno::NonConvergentInversePhi2,
        EngineError::ToleranceConditionError => ProjErrno::ToleranceCondition,
        EngineError::NadGridNotAvailable
        | EngineError::NadGridParentNotFound
        | EngineError::GridFileNotFound(_)
        | EngineError::UnknownGridFormat
        | EngineError::InvalidNtv2GridFormat(_)
        | EngineError::IoError(_) => ProjErrno::DatumShiftFile,
        EngineError::PointOutsideNadShiftArea | EngineError::InverseGridShiftConvError => {
            ProjErrno::OutsideShiftGrid
        }
        _ => fallback,
    }
}
