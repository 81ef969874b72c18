//! Name-keyed entity registries and JSON persistence (SPEC_FULL §6, §12).

pub mod channel_registry;
pub mod client_registry;
pub mod error;
pub mod persistence;
pub mod queue_registry;
pub mod router_registry;

pub use channel_registry::ChannelRegistry;
pub use client_registry::ClientRegistry;
pub use error::RegistryError;
pub use persistence::{JsonFilePersistence, PersistedBinding, PersistedQueue, PersistedRouter, PersistenceError, PersistenceStore};
pub use queue_registry::QueueRegistry;
pub use router_registry::RouterRegistry;

/// Narrow `names` down to those matching `pattern` (the `Filter` header on
/// list operations, SPEC_FULL §6). An unparseable pattern matches nothing
/// rather than panicking or silently returning everything.
pub(crate) fn filter_names(names: Vec<String>, pattern: &str) -> Vec<String> {
    match glob::Pattern::new(pattern) {
        Ok(glob) => names.into_iter().filter(|name| glob.matches(name)).collect(),
        Err(_) => Vec::new(),
    }
}
