//! Connected-client registry (SPEC_FULL §3 `Client` ownership).

use dashmap::DashMap;

use crate::client::{Client, ClientRef};
use crate::util::ClientId;

/// Owns every connected [`Client`] by id, and indexes by name/type for the
/// `@name:`/`@type:` direct-binding selectors (SPEC_FULL §4.6).
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<ClientId, Client>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly-connected client.
    pub fn register(&self, handle: ClientRef) -> ClientRef {
        self.clients.insert(handle.id(), Client::new(handle.clone()));
        handle
    }

    /// Remove a client and every subscription record it held. Callers
    /// (queue/channel subscriptions) must separately prune their own
    /// back-references on disconnect (SPEC_FULL §3 "back-references are
    /// removed synchronously").
    pub fn unregister(&self, id: ClientId) -> Option<ClientRef> {
        self.clients.remove(&id).map(|(_, c)| c.handle)
    }

    /// Look up a client by id.
    pub fn get(&self, id: ClientId) -> Option<ClientRef> {
        self.clients.get(&id).map(|entry| entry.handle.clone())
    }

    /// All currently-connected clients whose name matches `name` exactly
    /// (the `@name:` selector in [`crate::router::binding::DirectBinding`]).
    pub fn by_name(&self, name: &str) -> Vec<ClientRef> {
        self.clients
            .iter()
            .filter(|entry| entry.handle.name() == name)
            .map(|entry| entry.handle.clone())
            .collect()
    }

    /// All currently-connected clients of the given type (the `@type:`
    /// selector).
    pub fn by_type(&self, client_type: &str) -> Vec<ClientRef> {
        self.clients
            .iter()
            .filter(|entry| entry.handle.client_type().0 == client_type)
            .map(|entry| entry.handle.clone())
            .collect()
    }

    /// Record that `client` is now subscribed to `target` (a queue or
    /// channel name), for introspection and bulk-unsubscribe support.
    pub fn add_subscription(&self, client: ClientId, target: &str) {
        if let Some(entry) = self.clients.get(&client) {
            entry.add_subscription(target);
        }
    }

    /// Remove a recorded subscription.
    pub fn remove_subscription(&self, client: ClientId, target: &str) {
        if let Some(entry) = self.clients.get(&client) {
            entry.remove_subscription(target);
        }
    }

    /// Number of connected clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry holds no clients.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientType, DisconnectedSink};
    use std::sync::Arc;

    fn handle(name: &str, client_type: &str) -> ClientRef {
        ClientRef::new(ClientId::new(), name, ClientType(client_type.to_string()), Arc::new(DisconnectedSink))
    }

    #[test]
    fn register_then_lookup_by_id() {
        let registry = ClientRegistry::new();
        let handle = handle("alice", "consumer");
        let id = handle.id();
        registry.register(handle);
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn by_type_matches_every_client_of_that_type() {
        let registry = ClientRegistry::new();
        registry.register(handle("a", "worker"));
        registry.register(handle("b", "worker"));
        registry.register(handle("c", "producer"));
        assert_eq!(registry.by_type("worker").len(), 2);
    }

    #[test]
    fn by_name_matches_exact_name_only() {
        let registry = ClientRegistry::new();
        registry.register(handle("alice", "consumer"));
        registry.register(handle("alice", "consumer"));
        registry.register(handle("bob", "consumer"));
        assert_eq!(registry.by_name("alice").len(), 2);
    }

    #[test]
    fn unregister_removes_entry() {
        let registry = ClientRegistry::new();
        let handle = handle("alice", "consumer");
        let id = handle.id();
        registry.register(handle);
        assert!(registry.unregister(id).is_some());
        assert!(registry.get(id).is_none());
    }
}
