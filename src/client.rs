//! Connected clients (SPEC_FULL §3 `Client`).

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::message::Message;
use crate::util::ClientId;

/// A client's outbound connection.
///
/// The protocol framing/transport itself is out of scope (SPEC_FULL §1); this
/// trait is the narrow seam the core sends frames through. Implementations
/// own the actual socket/channel and report whether the client is still
/// reachable.
#[async_trait]
pub trait ClientSink: Send + Sync {
    /// Attempt to deliver `message` to this client. Returns `false` if the
    /// client is no longer reachable.
    async fn send(&self, message: Message) -> bool;

    /// Whether this sink currently believes its client is connected.
    fn is_connected(&self) -> bool;
}

/// A [`ClientSink`] that never delivers; used for offline/disconnected
/// clients and in tests.
#[derive(Debug, Default)]
pub struct DisconnectedSink;

#[async_trait]
impl ClientSink for DisconnectedSink {
    async fn send(&self, _message: Message) -> bool {
        false
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// How a client identifies itself to routing (`@type:` selectors in direct
/// bindings match on this).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientType(pub String);

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct ClientInner {
    id: ClientId,
    name: RwLock<String>,
    client_type: ClientType,
    is_authenticated: AtomicBool,
    sink: Arc<dyn ClientSink>,
}

/// A cheap, cloneable handle to a connected client.
///
/// Registries (`ClientRegistry`) hold the canonical entry; every other
/// subsystem (`QueueClient`, `DeliveryTracker`, `QueueMessage::source`) holds
/// a clone of this handle rather than a `Weak` pointer — on disconnect the
/// registry removes its entry and every dependent structure is walked and
/// pruned synchronously (SPEC_FULL §3 "On client disconnect, all
/// back-references are removed synchronously"), so a stray clone simply
/// reports `is_connected() == false` until it is pruned.
#[derive(Clone)]
pub struct ClientRef(Arc<ClientInner>);

impl ClientRef {
    /// Construct a new client handle.
    pub fn new(id: ClientId, name: impl Into<String>, client_type: ClientType, sink: Arc<dyn ClientSink>) -> Self {
        Self(Arc::new(ClientInner {
            id,
            name: RwLock::new(name.into()),
            client_type,
            is_authenticated: AtomicBool::new(false),
            sink,
        }))
    }

    /// This client's unique id.
    pub fn id(&self) -> ClientId {
        self.0.id
    }

    /// This client's display name.
    pub fn name(&self) -> String {
        self.0.name.read().clone()
    }

    /// This client's type tag, used for `@type:` selectors.
    pub fn client_type(&self) -> &ClientType {
        &self.0.client_type
    }

    /// Whether this client has passed authentication.
    pub fn is_authenticated(&self) -> bool {
        self.0.is_authenticated.load(Ordering::Acquire)
    }

    /// Record that this client has passed authentication.
    pub fn set_authenticated(&self, value: bool) {
        self.0.is_authenticated.store(value, Ordering::Release);
    }

    /// Whether the underlying sink still considers this client connected.
    pub fn is_connected(&self) -> bool {
        self.0.sink.is_connected()
    }

    /// Attempt to deliver `message`, returning whether it was accepted.
    pub async fn send(&self, message: Message) -> bool {
        self.0.sink.send(message).await
    }
}

impl fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRef")
            .field("id", &self.0.id)
            .field("name", &self.name())
            .field("type", &self.0.client_type)
            .finish()
    }
}

impl PartialEq for ClientRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ClientRef {}

impl Hash for ClientRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

/// A fully-owned client entry as held by a `ClientRegistry`.
pub struct Client {
    /// The cheap handle other subsystems hold.
    pub handle: ClientRef,
    /// Queues and channels this client is currently subscribed to, by name.
    pub subscriptions: RwLock<HashSet<String>>,
}

impl Client {
    /// Wrap a newly-registered client handle.
    pub fn new(handle: ClientRef) -> Self {
        Self {
            handle,
            subscriptions: RwLock::new(HashSet::new()),
        }
    }

    /// Record a subscription to `target` (a queue or channel name).
    pub fn add_subscription(&self, target: impl Into<String>) {
        self.subscriptions.write().insert(target.into());
    }

    /// Remove a subscription to `target`.
    pub fn remove_subscription(&self, target: &str) {
        self.subscriptions.write().remove(target);
    }
}
