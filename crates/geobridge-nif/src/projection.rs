//! Projection handles
//!
//! A handle owns an initialized projection and the error context it was
//! created under. Nothing is exposed to the host unless initialization
//! succeeded.

use crate::error::{NativeError, NifResult, RegistryError};
use crate::marshal;
use crate::native::{Pj, ProjContext};
use crate::registry::{Handle, OpenFlags, ResourceRegistry, ResourceType};
use crate::term::Term;
use std::ffi::CStr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Registered resource type name
pub const RESOURCE_TYPE: &str = "proj";

const STRUCT_TAG: &str = "projection";
const RESOURCE_KEY: &str = "pj";

/// Payload of a proj resource
///
/// Fields drop in declaration order: the projection before its context.
#[derive(Debug)]
pub struct Projection {
    pj: Pj,
    ctx: ProjContext,
}

impl Projection {
    /// Initialize a projection from a definition string
    ///
    /// On failure the freshly allocated context is freed before returning.
    pub fn from_definition(definition: &CStr) -> Result<Projection, NativeError> {
        let mut ctx = ProjContext::new();
        match Pj::init(&mut ctx, definition) {
            Ok(pj) => Ok(Projection { pj, ctx }),
            Err(e) => {
                debug!(
                    errno = e.errno.code(),
                    detail = e.detail.as_deref().unwrap_or(""),
                    "projection definition rejected"
                );
                Err(e)
            }
        }
    }

    /// Canonical definition string
    pub fn definition(&self) -> &str {
        self.pj.definition()
    }

    pub fn is_latlong(&self) -> bool {
        self.pj.is_latlong()
    }

    /// Reproject a single point into `dst`
    pub fn transform(&self, dst: &Projection, point: (f64, f64, f64)) -> Result<(f64, f64, f64), NativeError> {
        Pj::transform(&self.pj, &dst.pj, point).map_err(|e| {
            debug!(
                errno = e.errno.code(),
                detail = e.detail.as_deref().unwrap_or(""),
                "transform failed"
            );
            e
        })
    }
}

// `pj` then `ctx` are freed by the field drop that follows this hook.
fn release(projection: &mut Projection) {
    trace!(
        ctx = projection.ctx.id(),
        definition = projection.definition(),
        "releasing projection"
    );
}

/// Register (or take over) the proj resource type
pub fn open_resource_type(
    registry: &ResourceRegistry,
    flags: OpenFlags,
) -> Result<Arc<ResourceType>, RegistryError> {
    registry.open_resource_type(RESOURCE_TYPE, release, flags)
}

/// Parse `definition` and wrap the result in a new handle
pub fn construct(kind: &Arc<ResourceType>, definition: &CStr) -> Result<Handle<Projection>, NativeError> {
    Projection::from_definition(definition).map(|projection| kind.alloc(projection))
}

/// `%{__struct__: :projection, pj: resource}`
pub fn to_term(handle: Handle<Projection>) -> Term {
    marshal::make_handle_map(STRUCT_TAG, RESOURCE_KEY, handle, Vec::new())
}

pub fn from_term(term: &Term, kind: &Arc<ResourceType>) -> NifResult<Handle<Projection>> {
    marshal::get_resource(term, RESOURCE_KEY, kind)
}
