//! Dependency resolution for custom validators
//!
//! Custom validators often need services (a user store, a clock, a cache).
//! They receive a [`DependencyResolver`] and ask it for a service by type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Hands out services by type
pub trait DependencyResolver: Send + Sync {
    fn resolve_any(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)>;
}

impl<'r> dyn DependencyResolver + 'r {
    /// Typed lookup
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.resolve_any(TypeId::of::<T>())
            .and_then(|service| service.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.resolve_any(TypeId::of::<T>()).is_some()
    }
}

/// Services keyed by their type
#[derive(Clone, Default)]
pub struct ServiceMap {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service, replacing any previous one of the same type
    pub fn insert<T: Any + Send + Sync>(&mut self, service: T) {
        self.services.insert(TypeId::of::<T>(), Arc::new(service));
    }

    /// Share an existing `Arc` without cloning the service
    pub fn insert_arc<T: Any + Send + Sync>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), service);
    }

    pub fn with<T: Any + Send + Sync>(mut self, service: T) -> Self {
        self.insert(service);
        self
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl DependencyResolver for ServiceMap {
    fn resolve_any(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.services.get(&type_id).map(|service| service.as_ref())
    }
}

impl fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMap")
            .field("services", &self.services.len())
            .finish()
    }
}
