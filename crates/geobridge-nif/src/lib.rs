//! Geobridge native bindings
//!
//! Exposes a geodesic solver and a cartographic projection engine to a
//! garbage-collected host runtime. Native objects live behind registry
//! handles whose lifetime follows the host's references.
//!
//! # Layout
//!
//! - [`term`]: host value model
//! - [`marshal`]: term to native conversions
//! - [`registry`]: resource types, handles, pins
//! - [`geodesic`], [`projection`]: the two handle kinds
//! - [`nif`]: exported function tables
//! - [`lifecycle`]: load and unload
//!
//! # Example
//!
//! ```rust,no_run
//! use geobridge_config::BridgeConfig;
//! use geobridge_nif::{Bridge, ResourceRegistry, Term};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ResourceRegistry::new());
//! let bridge = Bridge::load(registry, &BridgeConfig::default()).unwrap();
//!
//! let merc = bridge
//!     .call("proj", "from_def", &[Term::string("+proj=merc +ellps=WGS84")])
//!     .unwrap();
//! println!("{:?}", merc);
//!
//! bridge.unload();
//! ```

pub mod error;
pub mod geodesic;
pub mod lifecycle;
pub mod marshal;
pub mod native;
pub mod nif;
pub mod projection;
pub mod registry;
pub mod term;

pub use error::{LoadError, NativeError, NifError, NifResult, ProjErrno, RegistryError};
pub use geodesic::{DirectSolution, Ellipsoid, InverseSolution, LatLng};
pub use lifecycle::Bridge;
pub use projection::Projection;
pub use registry::{Handle, OpenFlags, ResourceId, ResourceRef, ResourceRegistry, ResourceType};
pub use term::{Term, TermMap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
