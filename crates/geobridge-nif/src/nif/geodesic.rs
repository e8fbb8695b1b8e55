use super::NifFunc;
use crate::error::NifResult;
use crate::geodesic::{self, LatLng};
use crate::lifecycle::Bridge;
use crate::marshal::{get_number, get_pair};
use crate::term::Term;

pub(super) const FUNCS: &[NifFunc] = &[
    NifFunc {
        name: "init",
        arity: 2,
        fun: init,
    },
    NifFunc {
        name: "wgs84",
        arity: 0,
        fun: wgs84,
    },
    NifFunc {
        name: "direct",
        arity: 4,
        fun: direct,
    },
    NifFunc {
        name: "inverse",
        arity: 3,
        fun: inverse,
    },
];

/// `init(a, f)`
fn init(bridge: &Bridge, args: &[Term]) -> NifResult<Term> {
    let a = get_number(&args[0])?;
    let f = get_number(&args[1])?;

    let handle = geodesic::construct(bridge.geodesic_type(), a, f);
    Ok(geodesic::to_term(handle))
}

fn wgs84(bridge: &Bridge, _args: &[Term]) -> NifResult<Term> {
    Ok(geodesic::to_term(bridge.default_ellipsoid()?))
}

/// `direct(handle, {lat, lng}, azimuth, distance)` -> `{{lat, lng}, azimuth}`
fn direct(bridge: &Bridge, args: &[Term]) -> NifResult<Term> {
    let handle = geodesic::from_term(&args[0], bridge.geodesic_type())?;
    let (lat, lng) = get_pair(&args[1])?;
    let azimuth = get_number(&args[2])?;
    let distance = get_number(&args[3])?;

    let solution = handle
        .get()
        .direct(LatLng::new(lat, lng), azimuth, distance);

    let LatLng { lat, lng } = solution.destination;
    Ok(((lat, lng), solution.azimuth).into())
}

/// `inverse(handle, {lat1, lng1}, {lat2, lng2})` -> `{distance, azimuth1, azimuth2}`
fn inverse(bridge: &Bridge, args: &[Term]) -> NifResult<Term> {
    let handle = geodesic::from_term(&args[0], bridge.geodesic_type())?;
    let (lat1, lng1) = get_pair(&args[1])?;
    let (lat2, lng2) = get_pair(&args[2])?;

    let solution = handle
        .get()
        .inverse(LatLng::new(lat1, lng1), LatLng::new(lat2, lng2));

    Ok((solution.distance, solution.azimuth1, solution.azimuth2).into())
}
