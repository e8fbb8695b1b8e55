//! Native handle registry
//!
//! Resource types are named once per process and may be taken over by a
//! reloaded module. Each allocated handle carries a reference to its type;
//! when the last host reference goes away the type's current destructor runs
//! exactly once.
//!
//! Ownership model:
//! - `Handle<T>` (`Arc<ResourceObject<T>>`) is a typed strong reference
//! - `ResourceRef` is the untyped form stored inside host terms
//! - pins (`keep`/`release`) hold a handle alive independent of any term

use crate::error::RegistryError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, trace};

/// Process-unique handle identifier
pub type ResourceId = u64;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

type Destructor = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// Typed strong reference to a native handle
pub type Handle<T> = Arc<ResourceObject<T>>;

/// How `open_resource_type` treats an existing registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlags {
    /// Fail if the name is already registered
    Create,
    /// Fail unless the name is already registered
    Takeover,
    /// Create, or take over a previous registration
    CreateOrTakeover,
}

impl OpenFlags {
    pub fn from_takeover(takeover: bool) -> Self {
        if takeover {
            OpenFlags::CreateOrTakeover
        } else {
            OpenFlags::Create
        }
    }
}

/// A named kind of native handle
pub struct ResourceType {
    name: String,
    dtor: RwLock<Destructor>,
    live: AtomicUsize,
}

impl ResourceType {
    fn new(name: &str, dtor: Destructor) -> Self {
        Self {
            name: name.to_string(),
            dtor: RwLock::new(dtor),
            live: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of handles of this type not yet destroyed
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Allocate a handle owning `value`
    pub fn alloc<T: Send + Sync + 'static>(self: &Arc<Self>, value: T) -> Handle<T> {
        let id = NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed);
        self.live.fetch_add(1, Ordering::SeqCst);
        trace!(kind = %self.name, id, "resource allocated");

        Arc::new(ResourceObject {
            id,
            kind: Arc::clone(self),
            value,
        })
    }

    fn set_dtor(&self, dtor: Destructor) {
        let mut slot = self.dtor.write().unwrap_or_else(PoisonError::into_inner);
        *slot = dtor;
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceType")
            .field("name", &self.name)
            .field("live", &self.live_count())
            .finish()
    }
}

/// Registry-allocated storage for one native value
pub struct ResourceObject<T: Send + Sync + 'static> {
    id: ResourceId,
    kind: Arc<ResourceType>,
    value: T,
}

impl<T: Send + Sync + 'static> ResourceObject<T> {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> &Arc<ResourceType> {
        &self.kind
    }

    pub fn get(&self) -> &T {
        &self.value
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for ResourceObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#Resource<{}.{}>", self.kind.name, self.id)
    }
}

impl<T: Send + Sync + 'static> Drop for ResourceObject<T> {
    fn drop(&mut self) {
        {
            let dtor = self.kind.dtor.read().unwrap_or_else(PoisonError::into_inner);
            dtor(&mut self.value);
        }
        self.kind.live.fetch_sub(1, Ordering::SeqCst);
        trace!(kind = %self.kind.name, id = self.id, "resource destroyed");
    }
}

trait AnyResource: Send + Sync + 'static {
    fn id(&self) -> ResourceId;
    fn kind(&self) -> &Arc<ResourceType>;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Send + Sync + 'static> AnyResource for ResourceObject<T> {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn kind(&self) -> &Arc<ResourceType> {
        &self.kind
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Untyped reference to a handle, as embedded in host terms
#[derive(Clone)]
pub struct ResourceRef(Arc<dyn AnyResource>);

impl ResourceRef {
    pub fn new<T: Send + Sync + 'static>(handle: Handle<T>) -> Self {
        ResourceRef(handle)
    }

    pub fn id(&self) -> ResourceId {
        self.0.id()
    }

    pub fn kind(&self) -> &Arc<ResourceType> {
        self.0.kind()
    }

    /// Recover the typed handle if this reference is of `kind`
    pub fn downcast<T: Send + Sync + 'static>(&self, kind: &Arc<ResourceType>) -> Option<Handle<T>> {
        if !Arc::ptr_eq(self.0.kind(), kind) {
            return None;
        }
        Arc::clone(&self.0).into_any().downcast::<ResourceObject<T>>().ok()
    }
}

impl PartialEq for ResourceRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Debug for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#Reference<{}.{}>", self.kind().name(), self.id())
    }
}

struct Pin {
    resource: ResourceRef,
    count: usize,
}

/// Process-wide table of resource types and pinned handles
#[derive(Default)]
pub struct ResourceRegistry {
    types: Mutex<HashMap<String, Arc<ResourceType>>>,
    pins: Mutex<HashMap<ResourceId, Pin>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, or take over an existing registration
    ///
    /// `dtor` runs once per handle, right before its value is dropped. On
    /// takeover the new destructor applies to handles created by the previous
    /// load as well.
    pub fn open_resource_type<T: Send + Sync + 'static>(
        &self,
        name: &str,
        dtor: fn(&mut T),
        flags: OpenFlags,
    ) -> Result<Arc<ResourceType>, RegistryError> {
        let dtor: Destructor = Arc::new(move |value: &mut dyn Any| {
            if let Some(value) = value.downcast_mut::<T>() {
                dtor(value);
            }
        });

        let mut types = lock(&self.types);
        match (types.get(name), flags) {
            (Some(_), OpenFlags::Create) => Err(RegistryError::AlreadyRegistered(name.to_string())),
            (Some(existing), _) => {
                existing.set_dtor(dtor);
                debug!(kind = name, "resource type taken over");
                Ok(Arc::clone(existing))
            }
            (None, OpenFlags::Takeover) => Err(RegistryError::NotRegistered(name.to_string())),
            (None, _) => {
                let kind = Arc::new(ResourceType::new(name, dtor));
                types.insert(name.to_string(), Arc::clone(&kind));
                debug!(kind = name, "resource type registered");
                Ok(kind)
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ResourceType>> {
        lock(&self.types).get(name).cloned()
    }

    /// Pin a handle so it outlives every host reference
    pub fn keep(&self, resource: &ResourceRef) {
        let mut pins = lock(&self.pins);
        pins.entry(resource.id())
            .or_insert_with(|| Pin {
                resource: resource.clone(),
                count: 0,
            })
            .count += 1;
    }

    /// Drop one pin. Returns false if the handle was not pinned.
    pub fn release(&self, id: ResourceId) -> bool {
        let removed = {
            let mut pins = lock(&self.pins);
            let Some(pin) = pins.get_mut(&id) else {
                return false;
            };
            pin.count -= 1;
            if pin.count == 0 {
                pins.remove(&id)
            } else {
                None
            }
        };
        // destructor may run here, outside the lock
        drop(removed);
        true
    }

    pub fn pinned(&self, id: ResourceId) -> Option<ResourceRef> {
        lock(&self.pins).get(&id).map(|pin| pin.resource.clone())
    }

    pub fn pin_count(&self, id: ResourceId) -> usize {
        lock(&self.pins).get(&id).map_or(0, |pin| pin.count)
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("types", &lock(&self.types).len())
            .field("pins", &lock(&self.pins).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    static FREED: AtomicUsize = AtomicUsize::new(0);

    struct Counted(u32);

    fn count_free(_: &mut Counted) {
        FREED.fetch_add(1, Ordering::SeqCst);
    }

    fn noop(_: &mut u32) {}

    static SWAPPED: AtomicUsize = AtomicUsize::new(0);

    fn noop_counted(_: &mut Counted) {}

    fn count_swapped(_: &mut Counted) {
        SWAPPED.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_create_twice_fails() {
        let registry = ResourceRegistry::new();
        registry.open_resource_type("t", noop, OpenFlags::Create).unwrap();

        let err = registry.open_resource_type("t", noop, OpenFlags::Create).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("t".to_string()));
    }

    #[test]
    fn test_takeover_requires_existing() {
        let registry = ResourceRegistry::new();
        let err = registry.open_resource_type("t", noop, OpenFlags::Takeover).unwrap_err();
        assert_eq!(err, RegistryError::NotRegistered("t".to_string()));
    }

    #[test]
    fn test_takeover_returns_same_type() {
        let registry = ResourceRegistry::new();
        let first = registry.open_resource_type("t", noop, OpenFlags::CreateOrTakeover).unwrap();
        let second = registry.open_resource_type("t", noop, OpenFlags::CreateOrTakeover).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&registry.lookup("t").unwrap(), &first));
    }

    #[test]
    fn test_destructor_runs_once_on_last_reference() {
        let registry = ResourceRegistry::new();
        let kind = registry
            .open_resource_type("counted", count_free, OpenFlags::Create)
            .unwrap();

        let before = FREED.load(Ordering::SeqCst);
        let handle = kind.alloc(Counted(7));
        let untyped = ResourceRef::new(Arc::clone(&handle));
        assert_eq!(kind.live_count(), 1);
        assert_eq!(handle.get().0, 7);

        drop(handle);
        assert_eq!(FREED.load(Ordering::SeqCst), before);
        assert_eq!(kind.live_count(), 1);

        drop(untyped);
        assert_eq!(FREED.load(Ordering::SeqCst), before + 1);
        assert_eq!(kind.live_count(), 0);
    }

    #[test]
    fn test_downcast_checks_kind() {
        let registry = ResourceRegistry::new();
        let a = registry.open_resource_type("a", noop, OpenFlags::Create).unwrap();
        let b = registry.open_resource_type("b", noop, OpenFlags::Create).unwrap();

        let resource = ResourceRef::new(a.alloc(1u32));
        assert!(resource.downcast::<u32>(&a).is_some());
        assert!(resource.downcast::<u32>(&b).is_none());
        assert!(resource.downcast::<u64>(&a).is_none());
    }

    #[test]
    fn test_pins_keep_handle_alive() {
        let registry = ResourceRegistry::new();
        let kind = registry.open_resource_type("p", noop, OpenFlags::Create).unwrap();
        let resource = ResourceRef::new(kind.alloc(3u32));
        let id = resource.id();

        registry.keep(&resource);
        registry.keep(&resource);
        drop(resource);
        assert_eq!(kind.live_count(), 1);
        assert_eq!(registry.pin_count(id), 2);

        assert!(registry.release(id));
        assert!(registry.pinned(id).is_some());
        assert!(registry.release(id));
        assert!(registry.pinned(id).is_none());
        assert_eq!(kind.live_count(), 0);
    }

    #[test]
    fn test_release_without_keep_is_noop() {
        let registry = ResourceRegistry::new();
        assert!(!registry.release(42));
    }

    #[test]
    fn test_handle_debug_names_kind_and_id() {
        let registry = ResourceRegistry::new();
        let kind = registry.open_resource_type("d", noop, OpenFlags::Create).unwrap();
        let handle = kind.alloc(5u32);
        let resource = ResourceRef::new(Arc::clone(&handle));

        assert_eq!(format!("{:?}", handle), format!("#Resource<d.{}>", handle.id()));
        assert_eq!(format!("{:?}", resource), format!("#Reference<d.{}>", handle.id()));
    }

    #[test]
    fn test_takeover_destructor_applies_to_existing_handles() {
        let registry = ResourceRegistry::new();
        let kind = registry.open_resource_type("swap", noop_counted, OpenFlags::Create).unwrap();
        let handle = kind.alloc(Counted(1));

        registry
            .open_resource_type("swap", count_swapped, OpenFlags::Takeover)
            .unwrap();
        drop(handle);
        assert_eq!(SWAPPED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = ResourceRegistry::new();
        let kind = registry.open_resource_type("u", noop, OpenFlags::Create).unwrap();
        let first = kind.alloc(0u32);
        let second = kind.alloc(0u32);
        assert_ne!(first.id(), second.id());
    }
}
