//! Host-callable function tables
//!
//! Each host module is a static table of `(name, arity, function)` entries.
//! Dispatch matches on both name and arity, so a wrong argument count is an
//! undefined function, never a partial call.
//!
//! # Example
//!
//! ```rust,no_run
//! use geobridge_nif::{Bridge, ResourceRegistry, Term};
//! use geobridge_config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let bridge = Bridge::load(Arc::new(ResourceRegistry::new()), &BridgeConfig::default()).unwrap();
//! let wgs84 = bridge.call("geodesic", "wgs84", &[]).unwrap();
//! let result = bridge
//!     .call(
//!         "geodesic",
//!         "inverse",
//!         &[wgs84, (0.0, 0.0).into(), (0.0, 1.0).into()],
//!     )
//!     .unwrap();
//! ```

mod geodesic;
mod proj;

use crate::error::{NifError, NifResult};
use crate::lifecycle::Bridge;
use crate::term::Term;

/// Function implementation: the loaded bridge plus exactly `arity` arguments
pub type NifFn = fn(&Bridge, &[Term]) -> NifResult<Term>;

/// One exported function
#[derive(Clone, Copy)]
pub struct NifFunc {
    pub name: &'static str,
    pub arity: usize,
    pub fun: NifFn,
}

impl std::fmt::Debug for NifFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A host module and its exports
#[derive(Debug)]
pub struct NifModule {
    pub name: &'static str,
    pub funcs: &'static [NifFunc],
}

impl NifModule {
    pub fn find(&self, name: &str, arity: usize) -> Option<&NifFunc> {
        self.funcs
            .iter()
            .find(|func| func.name == name && func.arity == arity)
    }

    /// Call `name` with `args`
    pub fn call(&self, bridge: &Bridge, name: &str, args: &[Term]) -> NifResult<Term> {
        let func = self.find(name, args.len()).ok_or_else(|| NifError::Undefined {
            module: self.name.to_string(),
            name: name.to_string(),
            arity: args.len(),
        })?;

        (func.fun)(bridge, args)
    }
}

/// Geodesic module: ellipsoid handles and the geodesic problems
pub static GEODESIC: NifModule = NifModule {
    name: "geodesic",
    funcs: geodesic::FUNCS,
};

/// Proj module: projection handles and point transforms
pub static PROJ: NifModule = NifModule {
    name: "proj",
    funcs: proj::FUNCS,
};

/// Every module the bridge exports
pub static MODULES: [&NifModule; 2] = [&GEODESIC, &PROJ];

pub fn find_module(name: &str) -> Option<&'static NifModule> {
    MODULES.iter().copied().find(|module| module.name == name)
}
