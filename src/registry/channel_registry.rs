//! Name-keyed broadcast channel registry (SPEC_FULL §6).

use std::sync::Arc;

use dashmap::DashMap;

use crate::channel::{Channel, ChannelOptions};
use crate::monitoring::{ChannelEvent, Monitor, NoopMonitor};
use crate::util::{canonical_key, validate_name};

use super::error::RegistryError;

/// Owns every named [`Channel`] in a broker instance.
pub struct ChannelRegistry<M: Monitor<ChannelEvent> + 'static = NoopMonitor<ChannelEvent>> {
    channels: DashMap<String, Arc<Channel<M>>>,
    monitor: M,
}

impl<M: Monitor<ChannelEvent> + 'static> ChannelRegistry<M> {
    /// Create an empty registry; `monitor` is cloned into each channel
    /// constructed through it.
    pub fn new(monitor: M) -> Self {
        Self {
            channels: DashMap::new(),
            monitor,
        }
    }

    /// Look up an existing channel by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<Channel<M>>> {
        self.channels.get(&canonical_key(name)).map(|entry| entry.clone())
    }

    /// Create a new channel. Fails if the name is invalid or already taken.
    pub fn create(&self, name: &str, options: ChannelOptions) -> Result<Arc<Channel<M>>, RegistryError> {
        validate_name(name)?;
        let key = canonical_key(name);
        if self.channels.contains_key(&key) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let channel = Arc::new(Channel::new(name, options, self.monitor.clone()));
        self.channels.insert(key, channel.clone());
        Ok(channel)
    }

    /// Remove and return a channel by name.
    pub fn remove(&self, name: &str) -> Option<Arc<Channel<M>>> {
        self.channels.remove(&canonical_key(name)).map(|(_, channel)| channel)
    }

    /// Every registered channel's display name.
    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|entry| entry.value().name().to_string()).collect()
    }

    /// Registered channel names matching a `Filter` glob (SPEC_FULL §6 list operations).
    pub fn names_matching(&self, pattern: &str) -> Vec<String> {
        super::filter_names(self.names(), pattern)
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channels are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl<M: Monitor<ChannelEvent> + 'static + Default> Default for ChannelRegistry<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}
