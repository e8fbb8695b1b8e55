//! Module lifecycle
//!
//! `Bridge::load` is the module's load hook: it opens both resource types,
//! builds the default ellipsoid and projection, and pins them in the
//! registry. The returned `Bridge` is the per-load context every exported
//! function receives. Unloading (or dropping) it releases the pins; handles
//! the host still holds stay valid until collected.

use crate::error::{LoadError, NativeError, NifError, NifResult, ProjErrno};
use crate::geodesic::{self, Ellipsoid};
use crate::nif;
use crate::projection::{self, Projection};
use crate::registry::{Handle, OpenFlags, ResourceId, ResourceRef, ResourceRegistry, ResourceType};
use crate::term::Term;
use geobridge_config::{BridgeConfig, ConfigLoader};
use std::ffi::CString;
use std::sync::Arc;
use tracing::{error, info};

/// Loaded bridge: resource types plus the pinned default handles
#[derive(Debug)]
pub struct Bridge {
    registry: Arc<ResourceRegistry>,
    geodesic_type: Arc<ResourceType>,
    proj_type: Arc<ResourceType>,
    default_ellipsoid: ResourceId,
    default_projection: ResourceId,
}

impl Bridge {
    /// Load the bridge against `registry`
    ///
    /// Fails if a resource type cannot be opened, the configuration is
    /// invalid, or the default projection cannot be created. Nothing stays
    /// pinned after a failed load.
    pub fn load(registry: Arc<ResourceRegistry>, config: &BridgeConfig) -> Result<Bridge, LoadError> {
        config.validate()?;

        let flags = OpenFlags::from_takeover(config.registry.takeover);
        let geodesic_type = geodesic::open_resource_type(&registry, flags)?;
        let proj_type = projection::open_resource_type(&registry, flags)?;

        let ellipsoid = geodesic::construct(&geodesic_type, config.ellipsoid.a, config.ellipsoid.f);
        let default_ellipsoid = pin(&registry, ellipsoid);

        let definition = &config.projection.default_definition;
        let default_projection = match build_default_projection(&proj_type, definition) {
            Ok(handle) => pin(&registry, handle),
            Err(source) => {
                error!(
                    definition = %definition,
                    errno = source.errno.code(),
                    "cannot create default projection"
                );
                registry.release(default_ellipsoid);
                return Err(LoadError::DefaultProjection {
                    definition: definition.clone(),
                    source,
                });
            }
        };

        info!(
            a = config.ellipsoid.a,
            f = config.ellipsoid.f,
            projection = %definition,
            "geobridge loaded"
        );

        Ok(Bridge {
            registry,
            geodesic_type,
            proj_type,
            default_ellipsoid,
            default_projection,
        })
    }

    /// Load with the built-in defaults plus `GEOBRIDGE_*` overrides
    pub fn load_with_env(registry: Arc<ResourceRegistry>) -> Result<Bridge, LoadError> {
        let config = ConfigLoader::new().load_defaults()?;
        Self::load(registry, &config)
    }

    /// Release the default handles
    pub fn unload(self) {
        drop(self);
    }

    /// Call an exported function by module, name and arity
    pub fn call(&self, module: &str, name: &str, args: &[Term]) -> NifResult<Term> {
        let module_table = nif::find_module(module).ok_or_else(|| NifError::Undefined {
            module: module.to_string(),
            name: name.to_string(),
            arity: args.len(),
        })?;

        module_table.call(self, name, args)
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn geodesic_type(&self) -> &Arc<ResourceType> {
        &self.geodesic_type
    }

    pub fn proj_type(&self) -> &Arc<ResourceType> {
        &self.proj_type
    }

    /// The ellipsoid pinned at load; same handle for the whole load
    pub fn default_ellipsoid(&self) -> NifResult<Handle<Ellipsoid>> {
        self.pinned(self.default_ellipsoid, &self.geodesic_type)
    }

    /// The projection pinned at load
    pub fn default_projection(&self) -> NifResult<Handle<Projection>> {
        self.pinned(self.default_projection, &self.proj_type)
    }

    fn pinned<T: Send + Sync + 'static>(&self, id: ResourceId, kind: &Arc<ResourceType>) -> NifResult<Handle<T>> {
        self.registry
            .pinned(id)
            .and_then(|resource| resource.downcast::<T>(kind))
            .ok_or_else(|| NifError::badarg(format!("default {} handle was released", kind.name())))
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.registry.release(self.default_ellipsoid);
        self.registry.release(self.default_projection);
        info!("geobridge unloaded");
    }
}

fn build_default_projection(kind: &Arc<ResourceType>, definition: &str) -> Result<Handle<Projection>, NativeError> {
    let definition = CString::new(definition)
        .map_err(|e| NativeError::with_detail(ProjErrno::Unparseable, e.to_string()))?;
    projection::construct(kind, &definition)
}

fn pin<T: Send + Sync + 'static>(registry: &ResourceRegistry, handle: Handle<T>) -> ResourceId {
    let resource = ResourceRef::new(handle);
    registry.keep(&resource);
    resource.id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geobridge_config::ConfigError;

    fn load() -> Bridge {
        Bridge::load(Arc::new(ResourceRegistry::new()), &BridgeConfig::default()).unwrap()
    }

    #[test]
    fn test_defaults_are_pinned_and_stable() {
        let bridge = load();
        let first = bridge.default_ellipsoid().unwrap();
        let second = bridge.default_ellipsoid().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.get().a(), 6378137.0);

        let projection = bridge.default_projection().unwrap();
        assert_eq!(projection.get().definition(), "+proj=longlat +datum=WGS84 +no_defs");
    }

    #[test]
    fn test_unload_releases_defaults() {
        let bridge = load();
        let geodesic_type = Arc::clone(bridge.geodesic_type());
        let proj_type = Arc::clone(bridge.proj_type());
        assert_eq!(geodesic_type.live_count(), 1);
        assert_eq!(proj_type.live_count(), 1);

        bridge.unload();
        assert_eq!(geodesic_type.live_count(), 0);
        assert_eq!(proj_type.live_count(), 0);
    }

    #[test]
    fn test_bad_default_projection_is_fatal() {
        let registry = Arc::new(ResourceRegistry::new());
        let mut config = BridgeConfig::default();
        config.projection.default_definition = "+ellps=WGS84".to_string();

        let err = Bridge::load(Arc::clone(&registry), &config).unwrap_err();
        assert!(matches!(err, LoadError::DefaultProjection { .. }));

        let geodesic_type = registry.lookup(geodesic::RESOURCE_TYPE).unwrap();
        assert_eq!(geodesic_type.live_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = BridgeConfig::default();
        config.ellipsoid.a = 0.0;

        let err = Bridge::load(Arc::new(ResourceRegistry::new()), &config).unwrap_err();
        assert!(matches!(err, LoadError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_create_only_policy_rejects_reload() {
        let registry = Arc::new(ResourceRegistry::new());
        let mut config = BridgeConfig::default();
        config.registry.takeover = false;

        let first = Bridge::load(Arc::clone(&registry), &config).unwrap();
        let err = Bridge::load(Arc::clone(&registry), &config).unwrap_err();
        assert!(matches!(err, LoadError::Registration(_)));
        first.unload();
    }
}
