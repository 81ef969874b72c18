//! Router bindings (SPEC_FULL §4.6).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::client::ClientRef;
use crate::message::{Message, MessageKind};
use crate::queue::QueueSink;
use crate::registry::ClientRegistry;
use crate::util::ClientId;

use super::RouteMethod;

/// How long a [`DirectBinding`]'s resolved client list is cached before the
/// selector is re-evaluated against the live [`ClientRegistry`].
const DIRECT_CACHE_TTL: Duration = Duration::from_secs(1);

/// What a binding expects after a successful send (SPEC_FULL §3 `Binding`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// No response or ack is expected.
    None,
    /// The target is expected to ack the message.
    Ack,
    /// The target is expected to send back a response frame.
    Response,
}

/// A `Binding`'s configuration, independent of the connections it currently
/// resolves to (SPEC_FULL §6 persisted router config).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSnapshot {
    /// This binding's name, unique within its owning router.
    pub name: String,
    /// `"queue"` for a [`QueueBinding`], `"direct"` for a [`DirectBinding`].
    pub kind: &'static str,
    /// Bound queue name, or the `@type:`/`@name:`/client-id selector.
    pub target: String,
    /// Insertion-sort priority; higher runs first.
    pub priority: i32,
    /// What interaction this binding expects from its target.
    pub interaction: Interaction,
    /// Fan-out policy across multiple resolved targets; `None` for
    /// [`QueueBinding`], which has exactly one target.
    pub route_method: Option<RouteMethod>,
    /// Content-type override applied before forwarding, if any.
    pub content_type: Option<u16>,
}

/// A router's forwarding rule: adapts a published message for one target and
/// attempts delivery (SPEC_FULL §4.6).
#[async_trait]
pub trait Binding: Send + Sync {
    /// This binding's name, unique within its owning router.
    fn name(&self) -> &str;

    /// Insertion-sort key; higher priority bindings are tried first.
    fn priority(&self) -> i32;

    /// What interaction this binding expects from its target.
    fn interaction(&self) -> Interaction;

    /// This binding's configuration, for persisting the owning router's
    /// binding set (SPEC_FULL §6).
    fn snapshot(&self) -> BindingSnapshot;

    /// Forward `message` to this binding's target, returning whether it was
    /// accepted.
    async fn send(&self, sender: Option<ClientRef>, message: Message) -> bool;
}

/// Forwards a published message to a single named queue (SPEC_FULL §4.6).
pub struct QueueBinding {
    name: String,
    priority: i32,
    content_type: Option<u16>,
    interaction: Interaction,
    queue: Arc<dyn QueueSink>,
}

impl QueueBinding {
    /// Create a binding that forwards to `queue`.
    pub fn new(name: impl Into<String>, priority: i32, interaction: Interaction, queue: Arc<dyn QueueSink>) -> Self {
        Self {
            name: name.into(),
            priority,
            content_type: None,
            interaction,
            queue,
        }
    }

    /// Override the message's content type before forwarding.
    pub fn with_content_type(mut self, content_type: u16) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

#[async_trait]
impl Binding for QueueBinding {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    fn snapshot(&self) -> BindingSnapshot {
        BindingSnapshot {
            name: self.name.clone(),
            kind: "queue",
            target: self.queue.name().to_string(),
            priority: self.priority,
            interaction: self.interaction,
            route_method: None,
            content_type: self.content_type,
        }
    }

    async fn send(&self, sender: Option<ClientRef>, mut message: Message) -> bool {
        message.kind = MessageKind::QueueMessage;
        message.target = self.queue.name().to_string();
        if let Some(content_type) = self.content_type {
            message.content_type = content_type;
        }
        if self.interaction == Interaction::Response {
            message.wait_response = true;
        }
        self.queue.push(message, sender).await.is_success()
    }
}

/// A parsed `DirectBinding` target selector.
enum DirectTarget {
    /// `@type:<clientType>` — every connected client of that type.
    ByType(String),
    /// `@name:<name>` — every connected client with that exact name.
    ByName(String),
    /// A bare client id — exactly one client.
    ById(ClientId),
}

fn parse_target(target: &str) -> DirectTarget {
    if let Some(rest) = target.strip_prefix("@type:") {
        DirectTarget::ByType(rest.to_string())
    } else if let Some(rest) = target.strip_prefix("@name:") {
        DirectTarget::ByName(rest.to_string())
    } else {
        match Uuid::parse_str(target) {
            Ok(uuid) => DirectTarget::ById(ClientId::from_uuid(uuid)),
            Err(_) => DirectTarget::ByName(target.to_string()),
        }
    }
}

/// Forwards a published message directly to one or more connected clients,
/// resolved through a selector against the shared [`ClientRegistry`]
/// (SPEC_FULL §4.6). The resolved list is cached for [`DIRECT_CACHE_TTL`] so
/// a busy router isn't re-scanning the registry on every publish.
/// A predicate narrowing a [`DirectBinding`]'s resolved client list, applied
/// after the `@type:`/`@name:`/by-id selector and before route-method
/// fan-out (SPEC_FULL §4.6).
pub type ClientFilter = Arc<dyn Fn(&ClientRef) -> bool + Send + Sync>;

pub struct DirectBinding {
    name: String,
    priority: i32,
    content_type: Option<u16>,
    interaction: Interaction,
    target: String,
    route_method: RouteMethod,
    clients: Arc<ClientRegistry>,
    filter: Option<ClientFilter>,
    cache: Mutex<Option<(Instant, Vec<ClientRef>)>>,
    cursor: AtomicUsize,
}

impl DirectBinding {
    /// Create a binding that resolves `target` against `clients` and sends
    /// through `route_method` when more than one client matches.
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        interaction: Interaction,
        target: impl Into<String>,
        route_method: RouteMethod,
        clients: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            content_type: None,
            interaction,
            target: target.into(),
            route_method,
            clients,
            filter: None,
            cache: Mutex::new(None),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Override the message's content type before forwarding.
    pub fn with_content_type(mut self, content_type: u16) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Narrow the selector's resolved clients with `filter`; unset by
    /// default, which keeps every client the selector matched.
    pub fn with_filter(mut self, filter: ClientFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    fn resolve(&self) -> Vec<ClientRef> {
        let mut cache = self.cache.lock();
        if let Some((fetched_at, clients)) = cache.as_ref() {
            if fetched_at.elapsed() < DIRECT_CACHE_TTL {
                return clients.clone();
            }
        }
        let mut resolved = match parse_target(&self.target) {
            DirectTarget::ByType(client_type) => self.clients.by_type(&client_type),
            DirectTarget::ByName(name) => self.clients.by_name(&name),
            DirectTarget::ById(id) => self.clients.get(id).into_iter().collect(),
        };
        if let Some(filter) = &self.filter {
            resolved.retain(|client| filter(client));
        }
        *cache = Some((Instant::now(), resolved.clone()));
        resolved
    }
}

#[async_trait]
impl Binding for DirectBinding {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    fn snapshot(&self) -> BindingSnapshot {
        BindingSnapshot {
            name: self.name.clone(),
            kind: "direct",
            target: self.target.clone(),
            priority: self.priority,
            interaction: self.interaction,
            route_method: Some(self.route_method),
            content_type: self.content_type,
        }
    }

    async fn send(&self, _sender: Option<ClientRef>, mut message: Message) -> bool {
        message.kind = MessageKind::DirectMessage;
        if let Some(content_type) = self.content_type {
            message.content_type = content_type;
        }
        if self.interaction == Interaction::Response {
            message.wait_response = true;
        }

        let targets = self.resolve();
        if targets.is_empty() {
            return false;
        }

        match self.route_method {
            RouteMethod::Distribute => {
                let mut any_sent = false;
                for client in &targets {
                    if client.send(message.clone()).await {
                        any_sent = true;
                    }
                }
                any_sent
            }
            RouteMethod::OnlyFirst => {
                for client in &targets {
                    if client.send(message.clone()).await {
                        return true;
                    }
                }
                false
            }
            RouteMethod::RoundRobin => {
                let index = self.cursor.fetch_add(1, Ordering::Relaxed) % targets.len();
                targets[index].send(message).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientType, DisconnectedSink};
    use async_trait::async_trait as async_trait_attr;
    use bytes::Bytes;
    use std::sync::Mutex as StdMutex;

    struct RecordingSink(Arc<StdMutex<usize>>);

    #[async_trait_attr]
    impl crate::client::ClientSink for RecordingSink {
        async fn send(&self, _message: Message) -> bool {
            *self.0.lock().unwrap() += 1;
            true
        }
        fn is_connected(&self) -> bool {
            true
        }
    }

    fn message() -> Message {
        Message::new(MessageKind::DirectMessage, "ignored", Bytes::new())
    }

    #[tokio::test]
    async fn direct_binding_by_name_distributes_to_every_match() {
        let registry = Arc::new(ClientRegistry::new());
        let counter = Arc::new(StdMutex::new(0));
        for _ in 0..3 {
            registry.register(ClientRef::new(
                ClientId::new(),
                "worker",
                ClientType("consumer".into()),
                Arc::new(RecordingSink(counter.clone())),
            ));
        }
        let binding = DirectBinding::new("b", 0, Interaction::None, "@name:worker", RouteMethod::Distribute, registry);
        assert!(binding.send(None, message()).await);
        assert_eq!(*counter.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn direct_binding_round_robin_rotates() {
        let registry = Arc::new(ClientRegistry::new());
        let counters: Vec<_> = (0..2).map(|_| Arc::new(StdMutex::new(0))).collect();
        for counter in &counters {
            registry.register(ClientRef::new(
                ClientId::new(),
                "worker",
                ClientType("consumer".into()),
                Arc::new(RecordingSink(counter.clone())),
            ));
        }
        let binding = DirectBinding::new("b", 0, Interaction::None, "@name:worker", RouteMethod::RoundRobin, registry);
        for _ in 0..4 {
            assert!(binding.send(None, message()).await);
        }
        let total: usize = counters.iter().map(|c| *c.lock().unwrap()).sum();
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn direct_binding_with_no_match_fails() {
        let registry = Arc::new(ClientRegistry::new());
        let binding = DirectBinding::new("b", 0, Interaction::None, "@name:nobody", RouteMethod::OnlyFirst, registry);
        assert!(!binding.send(None, message()).await);
    }

    #[tokio::test]
    async fn direct_binding_filter_excludes_non_matching_clients() {
        let registry = Arc::new(ClientRegistry::new());
        let counters: Vec<_> = (0..3).map(|_| Arc::new(StdMutex::new(0))).collect();
        let mut ids = Vec::new();
        for counter in &counters {
            let client = ClientRef::new(
                ClientId::new(),
                "worker",
                ClientType("consumer".into()),
                Arc::new(RecordingSink(counter.clone())),
            );
            ids.push(client.id());
            registry.register(client);
        }
        let allowed = ids[1];
        let binding = DirectBinding::new("b", 0, Interaction::None, "@name:worker", RouteMethod::Distribute, registry)
            .with_filter(Arc::new(move |client| client.id() == allowed));
        assert!(binding.send(None, message()).await);
        let total: usize = counters.iter().map(|c| *c.lock().unwrap()).sum();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn direct_binding_by_id_resolves_single_client() {
        let registry = Arc::new(ClientRegistry::new());
        let client = ClientRef::new(ClientId::new(), "c", ClientType("consumer".into()), Arc::new(DisconnectedSink));
        let id = client.id();
        registry.register(client);
        let binding = DirectBinding::new("b", 0, Interaction::None, id.to_string(), RouteMethod::OnlyFirst, registry);
        assert!(!binding.send(None, message()).await);
    }
}
