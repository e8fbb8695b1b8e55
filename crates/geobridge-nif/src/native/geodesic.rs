use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};
use std::fmt;

/// Geodesic solver for one ellipsoid
///
/// Immutable after construction, so a single solver may be used from any
/// number of threads at once.
pub struct GeodSolver {
    geod: Geodesic,
}

impl GeodSolver {
    /// Solver for the ellipsoid with semi-major axis `a` and flattening `f`
    ///
    /// No range checks: degenerate parameters yield non-finite results.
    pub fn new(a: f64, f: f64) -> Self {
        Self {
            geod: Geodesic::new(a, f),
        }
    }

    pub fn wgs84() -> Self {
        Self {
            geod: Geodesic::wgs84(),
        }
    }

    pub fn a(&self) -> f64 {
        self.geod.a
    }

    pub fn f(&self) -> f64 {
        self.geod.f
    }

    /// Returns `(lat2, lon2, azi2)`, azimuth in [-180, 180]
    pub fn direct(&self, lat1: f64, lon1: f64, azi1: f64, s12: f64) -> (f64, f64, f64) {
        self.geod.direct(lat1, lon1, azi1, s12)
    }

    /// Returns `(s12, azi1, azi2)`, azimuths in [-180, 180]
    pub fn inverse(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64, f64) {
        let (s12, azi1, azi2, _a12): (f64, f64, f64, f64) =
            self.geod.inverse(lat1, lon1, lat2, lon2);
        (s12, azi1, azi2)
    }
}

impl fmt::Debug for GeodSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeodSolver")
            .field("a", &self.a())
            .field("f", &self.f())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_parameters() {
        let solver = GeodSolver::wgs84();
        assert_eq!(solver.a(), 6378137.0);
        assert!((solver.f() - 1.0 / 298.257223563).abs() < 1e-18);
    }

    #[test]
    fn test_negative_azimuth_is_raw() {
        let solver = GeodSolver::wgs84();
        let (_, _, azi2) = solver.direct(0.0, 0.0, -90.0, 1000.0);
        assert!((azi2 + 90.0).abs() < 1e-9);
    }
}
