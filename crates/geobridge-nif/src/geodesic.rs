//! Ellipsoid handles and the geodesic problems
//!
//! An ellipsoid handle is immutable. Direct and inverse solutions report
//! azimuths in `[0, 360)`, whatever range the solver itself uses.

use crate::error::{NifResult, RegistryError};
use crate::marshal;
use crate::native::GeodSolver;
use crate::registry::{Handle, OpenFlags, ResourceRegistry, ResourceType};
use crate::term::Term;
use std::sync::Arc;
use tracing::trace;

/// Registered resource type name
pub const RESOURCE_TYPE: &str = "geodesic";

const STRUCT_TAG: &str = "ellipsoid";
const RESOURCE_KEY: &str = "geod";

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Result of the direct problem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectSolution {
    pub destination: LatLng,
    /// Forward azimuth at the destination
    pub azimuth: f64,
}

/// Result of the inverse problem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    /// Meters
    pub distance: f64,
    pub azimuth1: f64,
    /// Forward azimuth at the second point
    pub azimuth2: f64,
}

/// Map a solver azimuth onto `[0, 360)`
///
/// Negative azimuths gain a full turn; everything else is returned as is.
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    if azimuth >= 0.0 || azimuth.is_nan() {
        return azimuth;
    }
    // -1e-17 + 360.0 rounds to exactly 360.0
    let turned = azimuth + 360.0;
    if turned >= 360.0 {
        0.0
    } else {
        turned
    }
}

/// Payload of a geodesic resource
#[derive(Debug)]
pub struct Ellipsoid {
    solver: GeodSolver,
}

impl Ellipsoid {
    pub fn new(a: f64, f: f64) -> Self {
        Self {
            solver: GeodSolver::new(a, f),
        }
    }

    pub fn wgs84() -> Self {
        Self {
            solver: GeodSolver::wgs84(),
        }
    }

    /// Semi-major axis in meters
    pub fn a(&self) -> f64 {
        self.solver.a()
    }

    pub fn f(&self) -> f64 {
        self.solver.f()
    }

    /// Destination reached from `from` along `azimuth` after `distance` meters
    pub fn direct(&self, from: LatLng, azimuth: f64, distance: f64) -> DirectSolution {
        let (lat, lng, azi2) = self.solver.direct(from.lat, from.lng, azimuth, distance);
        DirectSolution {
            destination: LatLng::new(lat, lng),
            azimuth: normalize_azimuth(azi2),
        }
    }

    /// Shortest geodesic between two points
    pub fn inverse(&self, from: LatLng, to: LatLng) -> InverseSolution {
        let (distance, azi1, azi2) = self.solver.inverse(from.lat, from.lng, to.lat, to.lng);
        InverseSolution {
            distance,
            azimuth1: normalize_azimuth(azi1),
            azimuth2: normalize_azimuth(azi2),
        }
    }
}

// The solver owns only scalars; nothing to free beyond the drop itself.
fn release(ellipsoid: &mut Ellipsoid) {
    trace!(a = ellipsoid.a(), f = ellipsoid.f(), "releasing ellipsoid");
}

/// Register (or take over) the geodesic resource type
pub fn open_resource_type(
    registry: &ResourceRegistry,
    flags: OpenFlags,
) -> Result<Arc<ResourceType>, RegistryError> {
    registry.open_resource_type(RESOURCE_TYPE, release, flags)
}

/// New ellipsoid handle; `a` and `f` are not range-checked
pub fn construct(kind: &Arc<ResourceType>, a: f64, f: f64) -> Handle<Ellipsoid> {
    kind.alloc(Ellipsoid::new(a, f))
}

/// `%{__struct__: :ellipsoid, geod: resource, a: a, f: f}`
pub fn to_term(handle: Handle<Ellipsoid>) -> Term {
    let a = handle.get().a();
    let f = handle.get().f();
    marshal::make_handle_map(
        STRUCT_TAG,
        RESOURCE_KEY,
        handle,
        vec![("a", Term::Float(a)), ("f", Term::Float(f))],
    )
}

pub fn from_term(term: &Term, kind: &Arc<ResourceType>) -> NifResult<Handle<Ellipsoid>> {
    marshal::get_resource(term, RESOURCE_KEY, kind)
}
