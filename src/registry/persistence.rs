//! JSON persistence for router and queue configuration (SPEC_FULL §6, §11).
//!
//! Every mutating registry operation that changes durable configuration
//! writes the routers-file and/or queues-file afterward. Per spec §7, a
//! write failure here is logged and swallowed — it never fails the mutation
//! that triggered it.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::router::{BindingSnapshot, Interaction, RouteMethod, RouterSnapshot};

/// Failure loading or parsing a persisted configuration file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be read or written.
    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file's contents were not valid JSON for the expected shape.
    #[error("persistence JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A router binding as persisted to the routers-file (SPEC_FULL §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBinding {
    /// Binding name, unique within its owning router.
    pub name: String,
    /// Binding class tag (`"queue"` or `"direct"`); unknown tags are skipped
    /// and logged at load time rather than rejecting the whole file
    /// (SPEC_FULL §9).
    #[serde(rename = "type")]
    pub kind: String,
    /// Queue name, or a `@type:`/`@name:`/client-id selector.
    pub target: String,
    /// Insertion-sort priority; higher runs first.
    pub priority: i32,
    /// `"none" | "ack" | "response"`.
    pub interaction: String,
    /// `"distribute" | "onlyFirst" | "roundRobin"`, direct bindings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Content-type override applied before forwarding, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<u16>,
}

/// A router as persisted to the routers-file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRouter {
    /// Router name.
    pub name: String,
    /// `"distribute" | "onlyFirst" | "roundRobin"`.
    pub method: String,
    /// Whether the router currently accepts publishes.
    pub is_enabled: bool,
    /// This router's bindings, most-recently-loaded priority order.
    pub bindings: Vec<PersistedBinding>,
}

/// A queue as persisted to the queues-file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedQueue {
    /// Queue name.
    pub name: String,
    /// `"push" | "roundRobin" | "pull"`.
    #[serde(rename = "type")]
    pub queue_type: String,
    /// Whether the queue currently accepts pushes.
    pub is_enabled: bool,
}

fn interaction_str(interaction: Interaction) -> String {
    match interaction {
        Interaction::None => "none",
        Interaction::Ack => "ack",
        Interaction::Response => "response",
    }
    .to_string()
}

fn route_method_str(method: RouteMethod) -> String {
    match method {
        RouteMethod::Distribute => "distribute",
        RouteMethod::OnlyFirst => "onlyFirst",
        RouteMethod::RoundRobin => "roundRobin",
    }
    .to_string()
}

impl From<BindingSnapshot> for PersistedBinding {
    fn from(snapshot: BindingSnapshot) -> Self {
        Self {
            name: snapshot.name,
            kind: snapshot.kind.to_string(),
            target: snapshot.target,
            priority: snapshot.priority,
            interaction: interaction_str(snapshot.interaction),
            method: snapshot.route_method.map(route_method_str),
            content_type: snapshot.content_type,
        }
    }
}

impl From<RouterSnapshot> for PersistedRouter {
    fn from(snapshot: RouterSnapshot) -> Self {
        Self {
            name: snapshot.name,
            method: route_method_str(snapshot.method),
            is_enabled: snapshot.is_enabled,
            bindings: snapshot.bindings.into_iter().map(PersistedBinding::from).collect(),
        }
    }
}

/// Durable storage for router and queue configuration (SPEC_FULL §6).
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Load the persisted router set, or an empty set if nothing was saved yet.
    async fn load_routers(&self) -> Result<Vec<PersistedRouter>, PersistenceError>;

    /// Overwrite the routers-file. Failures are logged and swallowed by
    /// callers, never propagated into a registry mutation's result.
    async fn save_routers(&self, routers: &[PersistedRouter]);

    /// Load the persisted queue set, or an empty set if nothing was saved yet.
    async fn load_queues(&self) -> Result<Vec<PersistedQueue>, PersistenceError>;

    /// Overwrite the queues-file.
    async fn save_queues(&self, queues: &[PersistedQueue]);
}

/// Default [`PersistenceStore`]: two flat JSON array files on local disk.
pub struct JsonFilePersistence {
    routers_path: PathBuf,
    queues_path: PathBuf,
}

impl JsonFilePersistence {
    /// Point at the given routers-file and queues-file paths. Neither needs
    /// to exist yet; [`load_routers`](PersistenceStore::load_routers) and
    /// [`load_queues`](PersistenceStore::load_queues) treat a missing file
    /// as an empty configuration.
    pub fn new(routers_path: impl Into<PathBuf>, queues_path: impl Into<PathBuf>) -> Self {
        Self {
            routers_path: routers_path.into(),
            queues_path: queues_path.into(),
        }
    }

    fn load<T: for<'de> Deserialize<'de>>(path: &PathBuf) -> Result<Vec<T>, PersistenceError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save<T: Serialize>(path: &PathBuf, items: &[T]) {
        let Ok(json) = serde_json::to_string_pretty(items) else {
            return;
        };
        let _ = std::fs::write(path, json);
    }
}

#[async_trait]
impl PersistenceStore for JsonFilePersistence {
    async fn load_routers(&self) -> Result<Vec<PersistedRouter>, PersistenceError> {
        Self::load(&self.routers_path)
    }

    async fn save_routers(&self, routers: &[PersistedRouter]) {
        Self::save(&self.routers_path, routers);
    }

    async fn load_queues(&self) -> Result<Vec<PersistedQueue>, PersistenceError> {
        Self::load(&self.queues_path)
    }

    async fn save_queues(&self, queues: &[PersistedQueue]) {
        Self::save(&self.queues_path, queues);
    }
}
