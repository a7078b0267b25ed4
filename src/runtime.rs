//! The service runtime as seen by the probe.
//!
//! A [`Runtime`] hands out a snapshot of its registered services. The probe
//! reads the snapshot and nothing else, so any broker can be plugged in by
//! implementing one method.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::adapter::Adapter;

/// One registered service instance.
#[derive(Clone)]
pub struct ServiceDescriptor {
    name: String,
    adapter: Option<Arc<dyn Adapter>>,
}

impl ServiceDescriptor {
    /// A service with no database adapter.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), adapter: None }
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn adapter(&self) -> Option<&dyn Adapter> { self.adapter.as_deref() }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("adapter", &self.adapter.as_ref().map(|a| a.kind()))
            .finish()
    }
}

/// Read access to a running broker's service list.
pub trait Runtime: Send + Sync {
    /// The services registered right now, in registration order.
    fn services(&self) -> Vec<ServiceDescriptor>;
}

impl<R: Runtime + ?Sized> Runtime for Arc<R> {
    fn services(&self) -> Vec<ServiceDescriptor> {
        (**self).services()
    }
}

// ── ServiceRegistry ───────────────────────────────────────────────────────────

/// In-memory [`Runtime`] for hosts that keep their own service list.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<Vec<ServiceDescriptor>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service. A service with the same name is replaced in place.
    pub fn register(&self, service: ServiceDescriptor) {
        let mut services = self.services.write();
        match services.iter_mut().find(|s| s.name == service.name) {
            Some(slot) => *slot = service,
            None => services.push(service),
        }
    }

    /// Removes a service by name. Returns whether it was registered.
    pub fn deregister(&self, name: &str) -> bool {
        let mut services = self.services.write();
        let before = services.len();
        services.retain(|s| s.name != name);
        services.len() != before
    }

    pub fn len(&self) -> usize { self.services.read().len() }
    pub fn is_empty(&self) -> bool { self.services.read().is_empty() }
}

impl Runtime for ServiceRegistry {
    fn services(&self) -> Vec<ServiceDescriptor> {
        self.services.read().clone()
    }
}
