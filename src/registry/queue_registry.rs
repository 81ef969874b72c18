//! Name-keyed queue registry (SPEC_FULL §6 persisted queue config).

use std::sync::Arc;

use dashmap::DashMap;

use crate::cluster::{ClusterCoordinator, NoopClusterCoordinator};
use crate::monitoring::{Monitor, NoopMonitor, QueueEvent};
use crate::queue::{DeliveryHandlerFactory, Queue, QueueOptions, QueueSink, QueueType};
use crate::util::{canonical_key, validate_name};

use super::error::RegistryError;
use super::persistence::PersistedQueue;

fn queue_type_str(queue_type: QueueType) -> String {
    match queue_type {
        QueueType::Push => "push",
        QueueType::RoundRobin => "roundRobin",
        QueueType::Pull => "pull",
    }
    .to_string()
}

/// Owns every named [`Queue`] in a broker instance.
///
/// Generic over [`Monitor`] like [`Queue`] itself; `monitor` is cloned into
/// each queue constructed through this registry (cheap for [`NoopMonitor`],
/// and for monitors whose state lives behind an `Arc` internally).
pub struct QueueRegistry<M: Monitor<QueueEvent> + 'static = NoopMonitor<QueueEvent>> {
    queues: DashMap<String, Arc<Queue<M>>>,
    factory: DeliveryHandlerFactory,
    monitor: M,
    cluster: Arc<dyn ClusterCoordinator>,
}

impl<M: Monitor<QueueEvent> + 'static> QueueRegistry<M> {
    /// Create an empty registry backed by a standalone cluster coordinator.
    pub fn new(monitor: M) -> Self {
        Self::with_cluster(monitor, Arc::new(NoopClusterCoordinator))
    }

    /// As [`QueueRegistry::new`], replicating queue mutations through `cluster`.
    pub fn with_cluster(monitor: M, cluster: Arc<dyn ClusterCoordinator>) -> Self {
        Self {
            queues: DashMap::new(),
            factory: DeliveryHandlerFactory::new(),
            monitor,
            cluster,
        }
    }

    /// The delivery-handler factory queues built through this registry use;
    /// register custom handler constructors here before creating queues.
    pub fn handler_factory(&self) -> &DeliveryHandlerFactory {
        &self.factory
    }

    /// Look up an existing queue by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<Queue<M>>> {
        self.queues.get(&canonical_key(name)).map(|entry| entry.clone())
    }

    /// Look up a queue, erased to [`QueueSink`], for callers (bindings,
    /// dispatcher) that don't need the concrete monitor type.
    pub fn get_sink(&self, name: &str) -> Option<Arc<dyn QueueSink>> {
        self.get(name).map(|queue| queue as Arc<dyn QueueSink>)
    }

    /// Create a new queue. Fails if the name is invalid or already taken.
    pub fn create(&self, name: &str, options: QueueOptions) -> Result<Arc<Queue<M>>, RegistryError> {
        validate_name(name)?;
        let key = canonical_key(name);
        if self.queues.contains_key(&key) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let queue = Queue::with_cluster(name, options, &self.factory, self.monitor.clone(), self.cluster.clone());
        self.queues.insert(key, queue.clone());
        Ok(queue)
    }

    /// Return the existing queue by this name, or create it with `options`
    /// (SPEC_FULL §4.8 `QueueSubscribe` auto-create).
    pub fn get_or_create(&self, name: &str, options: QueueOptions) -> Result<Arc<Queue<M>>, RegistryError> {
        validate_name(name)?;
        if let Some(queue) = self.get(name) {
            return Ok(queue);
        }
        match self.create(name, options) {
            Ok(queue) => Ok(queue),
            Err(RegistryError::Duplicate(_)) => self
                .get(name)
                .ok_or_else(|| RegistryError::NotFound(name.to_string())),
            Err(other) => Err(other),
        }
    }

    /// Remove and return a queue by name.
    pub fn remove(&self, name: &str) -> Option<Arc<Queue<M>>> {
        self.queues.remove(&canonical_key(name)).map(|(_, queue)| queue)
    }

    /// Every registered queue's display name.
    pub fn names(&self) -> Vec<String> {
        self.queues.iter().map(|entry| entry.value().name().to_string()).collect()
    }

    /// Registered queue names matching a `Filter` glob (SPEC_FULL §6 list operations).
    pub fn names_matching(&self, pattern: &str) -> Vec<String> {
        super::filter_names(self.names(), pattern)
    }

    /// Every registered queue's current configuration, for persisting to the
    /// queues-file (SPEC_FULL §6, §12).
    pub fn snapshot(&self) -> Vec<PersistedQueue> {
        self.queues
            .iter()
            .map(|entry| {
                let queue = entry.value();
                PersistedQueue {
                    name: queue.name().to_string(),
                    queue_type: queue_type_str(queue.options_snapshot().queue_type),
                    is_enabled: queue.status().accepts_push(),
                }
            })
            .collect()
    }

    /// Number of registered queues.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// Whether no queues are registered.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

impl<M: Monitor<QueueEvent> + 'static + Default> Default for QueueRegistry<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}
