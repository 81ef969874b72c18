//! Name-keyed router registry (SPEC_FULL §6 persisted router config).

use std::sync::Arc;

use dashmap::DashMap;

use crate::monitoring::{Monitor, NoopMonitor, RouterEvent};
use crate::router::{RouteMethod, Router};
use crate::util::{canonical_key, validate_name};

use super::error::RegistryError;
use super::persistence::PersistedRouter;

/// Owns every named [`Router`] in a broker instance.
pub struct RouterRegistry<M: Monitor<RouterEvent> + 'static = NoopMonitor<RouterEvent>> {
    routers: DashMap<String, Arc<Router<M>>>,
    monitor: M,
}

impl<M: Monitor<RouterEvent> + 'static> RouterRegistry<M> {
    /// Create an empty registry; `monitor` is cloned into each router
    /// constructed through it.
    pub fn new(monitor: M) -> Self {
        Self {
            routers: DashMap::new(),
            monitor,
        }
    }

    /// Look up an existing router by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<Router<M>>> {
        self.routers.get(&canonical_key(name)).map(|entry| entry.clone())
    }

    /// Create a new router. Fails if the name is invalid or already taken.
    pub fn create(&self, name: &str, method: RouteMethod) -> Result<Arc<Router<M>>, RegistryError> {
        validate_name(name)?;
        let key = canonical_key(name);
        if self.routers.contains_key(&key) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let router = Arc::new(Router::new(name, method, self.monitor.clone()));
        self.routers.insert(key, router.clone());
        Ok(router)
    }

    /// Remove and return a router by name.
    pub fn remove(&self, name: &str) -> Option<Arc<Router<M>>> {
        self.routers.remove(&canonical_key(name)).map(|(_, router)| router)
    }

    /// Every registered router's display name.
    pub fn names(&self) -> Vec<String> {
        self.routers.iter().map(|entry| entry.value().name().to_string()).collect()
    }

    /// Registered router names matching a `Filter` glob (SPEC_FULL §6 list operations).
    pub fn names_matching(&self, pattern: &str) -> Vec<String> {
        super::filter_names(self.names(), pattern)
    }

    /// Every registered router's current configuration and binding set, for
    /// persisting to the routers-file (SPEC_FULL §6, §12).
    pub fn snapshot(&self) -> Vec<PersistedRouter> {
        self.routers.iter().map(|entry| PersistedRouter::from(entry.value().snapshot())).collect()
    }

    /// Number of registered routers.
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    /// Whether no routers are registered.
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

impl<M: Monitor<RouterEvent> + 'static + Default> Default for RouterRegistry<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}
