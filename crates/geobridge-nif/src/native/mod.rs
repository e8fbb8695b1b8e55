//! Native engines
//!
//! Thin owners around the geodesic solver and the projection engine. Nothing
//! here knows about host terms.

pub mod geodesic;
pub mod proj;

pub use geodesic::GeodSolver;
pub use proj::{Pj, ProjContext};
