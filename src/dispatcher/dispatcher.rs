//! Inbound frame dispatch (SPEC_FULL §4.8).

use std::sync::Arc;

use chrono::Utc;

use crate::channel::{ChannelOptions, ChannelOptionsBuilder};
use crate::client::ClientRef;
use crate::headers;
use crate::message::{Message, MessageKind};
use crate::monitoring::{DispatchEvent, DispatchEventKind, Monitor, NoopMonitor};
use crate::queue::{QueueOptions, QueueOptionsBuilder, QueueStatus, QueueType};
use crate::registry::{ChannelRegistry, ClientRegistry, PersistenceStore, QueueRegistry, RouterRegistry};
use crate::result::{OperationResult, RouterPublishResult};
use crate::router::{Binding, DirectBinding, Interaction, QueueBinding, RouteMethod};
use crate::util::ClientId;

use super::auth::{AdminAuthorization, ClientAuthorization};
use super::frame;

fn parse_queue_type(value: Option<&str>) -> QueueType {
    match value {
        Some("RoundRobin") => QueueType::RoundRobin,
        Some("Pull") => QueueType::Pull,
        _ => QueueType::Push,
    }
}

fn parse_route_method(value: Option<&str>) -> RouteMethod {
    match value {
        Some("OnlyFirst") => RouteMethod::OnlyFirst,
        Some("RoundRobin") => RouteMethod::RoundRobin,
        _ => RouteMethod::Distribute,
    }
}

fn parse_queue_status(value: Option<&str>) -> Option<QueueStatus> {
    match value {
        Some("Running") => Some(QueueStatus::Running),
        Some("Paused") => Some(QueueStatus::Paused),
        Some("OnlyConsume") => Some(QueueStatus::OnlyConsume),
        Some("Syncing") => Some(QueueStatus::Syncing),
        _ => None,
    }
}

fn parse_acknowledge_mode(value: Option<&str>) -> crate::queue::AcknowledgeMode {
    match value {
        Some("just") => crate::queue::AcknowledgeMode::Just,
        Some("wait") => crate::queue::AcknowledgeMode::Wait,
        _ => crate::queue::AcknowledgeMode::None,
    }
}

/// Builds [`QueueOptions`] from an inbound message's headers (`Queue-Type`,
/// `Acknowledge`, `Message-Timeout`, `Ack-Timeout`, `Put-Back-Delay`,
/// `Delay-Between-Messages`, `Delivery-Handler`); an absent or unparseable
/// header leaves the corresponding option at its default.
fn queue_options_from_headers(message: &Message) -> QueueOptions {
    let mut builder = QueueOptionsBuilder::new()
        .queue_type(parse_queue_type(message.headers.get(headers::QUEUE_TYPE)))
        .acknowledge(parse_acknowledge_mode(message.headers.get(headers::ACKNOWLEDGE)));

    if let Some(seconds) = message.headers.get(headers::MESSAGE_TIMEOUT).and_then(|v| v.parse().ok()) {
        builder = builder.message_timeout(chrono::Duration::seconds(seconds));
    }
    if let Some(seconds) = message.headers.get(headers::ACK_TIMEOUT).and_then(|v| v.parse().ok()) {
        builder = builder.ack_timeout(chrono::Duration::seconds(seconds));
    }
    if let Some(millis) = message.headers.get(headers::PUT_BACK_DELAY).and_then(|v| v.parse().ok()) {
        builder = builder.put_back_delay(chrono::Duration::milliseconds(millis));
    }
    if let Some(millis) = message.headers.get(headers::DELAY_BETWEEN_MESSAGES).and_then(|v| v.parse().ok()) {
        builder = builder.delay_between_messages(chrono::Duration::milliseconds(millis));
    }
    if let Some(name) = message.headers.get(headers::DELIVERY_HANDLER) {
        builder = builder.delivery_handler_name(name);
    }

    builder.build().unwrap_or_default()
}

/// Routes decoded inbound frames to the appropriate queue, router, channel,
/// or direct-client operation, enforcing authorization along the way
/// (SPEC_FULL §4.8).
pub struct Dispatcher<
    QM: Monitor<crate::monitoring::QueueEvent> + 'static = NoopMonitor<crate::monitoring::QueueEvent>,
    RM: Monitor<crate::monitoring::RouterEvent> + 'static = NoopMonitor<crate::monitoring::RouterEvent>,
    CM: Monitor<crate::monitoring::ChannelEvent> + 'static = NoopMonitor<crate::monitoring::ChannelEvent>,
    DM: Monitor<DispatchEvent> + 'static = NoopMonitor<DispatchEvent>,
> {
    queues: Arc<QueueRegistry<QM>>,
    routers: Arc<RouterRegistry<RM>>,
    channels: Arc<ChannelRegistry<CM>>,
    clients: Arc<ClientRegistry>,
    admin_auth: Vec<Arc<dyn AdminAuthorization>>,
    client_auth: Vec<Arc<dyn ClientAuthorization>>,
    monitor: DM,
    persistence: Option<Arc<dyn PersistenceStore>>,
}

impl<QM, RM, CM, DM> Dispatcher<QM, RM, CM, DM>
where
    QM: Monitor<crate::monitoring::QueueEvent> + 'static,
    RM: Monitor<crate::monitoring::RouterEvent> + 'static,
    CM: Monitor<crate::monitoring::ChannelEvent> + 'static,
    DM: Monitor<DispatchEvent> + 'static,
{
    /// Assemble a dispatcher over the given registries.
    pub fn new(
        queues: Arc<QueueRegistry<QM>>,
        routers: Arc<RouterRegistry<RM>>,
        channels: Arc<ChannelRegistry<CM>>,
        clients: Arc<ClientRegistry>,
        monitor: DM,
    ) -> Self {
        Self {
            queues,
            routers,
            channels,
            clients,
            admin_auth: Vec::new(),
            client_auth: Vec::new(),
            monitor,
            persistence: None,
        }
    }

    /// Register a hook that must pass for every administrative operation.
    pub fn add_admin_authorization(&mut self, hook: Arc<dyn AdminAuthorization>) {
        self.admin_auth.push(hook);
    }

    /// Register a hook that must pass for every entity-scoped operation.
    pub fn add_client_authorization(&mut self, hook: Arc<dyn ClientAuthorization>) {
        self.client_auth.push(hook);
    }

    /// Persist the full queue and router configuration through `store` after
    /// every future configuration-mutating operation (SPEC_FULL §6, §12:
    /// "authorise; mutate; persist; notify cluster").
    pub fn set_persistence(&mut self, store: Arc<dyn PersistenceStore>) {
        self.persistence = Some(store);
    }

    async fn persist_queues(&self) {
        if let Some(store) = &self.persistence {
            store.save_queues(&self.queues.snapshot()).await;
        }
    }

    async fn persist_routers(&self) {
        if let Some(store) = &self.persistence {
            store.save_routers(&self.routers.snapshot()).await;
        }
    }

    async fn admin_allows(&self, sender: &ClientRef, message: &Message) -> bool {
        for hook in &self.admin_auth {
            if !hook.authorize(sender, message).await {
                return false;
            }
        }
        true
    }

    async fn client_allows(&self, sender: &ClientRef, message: &Message) -> bool {
        for hook in &self.client_auth {
            if !hook.authorize(sender, message).await {
                return false;
            }
        }
        true
    }

    async fn emit(&self, sender: &ClientRef, content_type: u16, outcome: OperationResult) {
        let kind = match outcome {
            OperationResult::Success => DispatchEventKind::Accepted { content_type },
            OperationResult::Unauthorized => DispatchEventKind::Unauthorized { content_type },
            other => DispatchEventKind::Rejected {
                content_type,
                reason: format!("{other:?}"),
            },
        };
        let _ = self
            .monitor
            .record(DispatchEvent {
                timestamp: Utc::now(),
                target: sender.name(),
                event_kind: kind,
                metadata: Default::default(),
            })
            .await;
    }

    /// Decode and apply `message`, sent by `sender` (SPEC_FULL §4.8).
    pub async fn dispatch(&self, sender: ClientRef, message: Message) -> OperationResult {
        let content_type = message.content_type;
        let outcome = self.dispatch_inner(&sender, message).await;
        self.emit(&sender, content_type, outcome).await;
        outcome
    }

    async fn dispatch_inner(&self, sender: &ClientRef, message: Message) -> OperationResult {
        match message.content_type {
            frame::QUEUE_SUBSCRIBE => self.queue_subscribe(sender, message).await,
            frame::QUEUE_UNSUBSCRIBE => self.queue_unsubscribe(sender, message).await,
            frame::CREATE_QUEUE => self.create_queue(sender, message).await,
            frame::REMOVE_QUEUE => self.remove_queue(sender, message).await,
            frame::UPDATE_QUEUE => self.update_queue(sender, message).await,
            frame::CLEAR_MESSAGES => self.clear_messages(sender, message).await,
            frame::PUBLISH => self.publish(sender, message).await,
            frame::CREATE_ROUTER => self.create_router(sender, message).await,
            frame::REMOVE_ROUTER => self.remove_router(sender, message).await,
            frame::CREATE_QUEUE_BINDING => self.create_queue_binding(sender, message).await,
            frame::CREATE_DIRECT_BINDING => self.create_direct_binding(sender, message).await,
            frame::REMOVE_BINDING => self.remove_binding(sender, message).await,
            frame::CHANNEL_SUBSCRIBE => self.channel_subscribe(sender, message).await,
            frame::CHANNEL_UNSUBSCRIBE => self.channel_unsubscribe(sender, message).await,
            frame::PEER_MESSAGE => self.peer_message(sender, message).await,
            _ => OperationResult::NotFound,
        }
    }

    async fn queue_subscribe(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.client_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let options = queue_options_from_headers(&message);
        let queue = match self.queues.get_or_create(&message.target, options) {
            Ok(queue) => queue,
            Err(_) => return OperationResult::Error,
        };
        queue.subscribe(sender.clone()).await;
        self.clients.add_subscription(sender.id(), &message.target);
        OperationResult::Success
    }

    async fn queue_unsubscribe(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if message.target == "*" {
            for name in self.queues.names() {
                if let Some(queue) = self.queues.get(&name) {
                    queue.unsubscribe(sender.id()).await;
                    self.clients.remove_subscription(sender.id(), &name);
                }
            }
            return OperationResult::Success;
        }
        let Some(queue) = self.queues.get(&message.target) else {
            return OperationResult::NotFound;
        };
        queue.unsubscribe(sender.id()).await;
        self.clients.remove_subscription(sender.id(), &message.target);
        OperationResult::Success
    }

    async fn create_queue(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let options = queue_options_from_headers(&message);
        let outcome = match self.queues.create(&message.target, options) {
            Ok(_) => OperationResult::Success,
            Err(crate::registry::RegistryError::Duplicate(_)) => OperationResult::Duplicate,
            Err(_) => OperationResult::Error,
        };
        if outcome == OperationResult::Success {
            self.persist_queues().await;
        }
        outcome
    }

    async fn remove_queue(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        match self.queues.remove(&message.target) {
            Some(_) => {
                self.persist_queues().await;
                OperationResult::Success
            }
            None => OperationResult::NotFound,
        }
    }

    async fn update_queue(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let Some(queue) = self.queues.get(&message.target) else {
            return OperationResult::NotFound;
        };
        let Some(status) = parse_queue_status(message.headers.get(headers::QUEUE_STATUS)) else {
            return OperationResult::Error;
        };
        if queue.set_status(status).await {
            self.persist_queues().await;
            OperationResult::Success
        } else {
            OperationResult::StatusNotSupported
        }
    }

    async fn clear_messages(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let Some(queue) = self.queues.get(&message.target) else {
            return OperationResult::NotFound;
        };
        let priority = message.headers.get(headers::CLEAR_PRIORITY) == Some("yes");
        let regular = message.headers.get(headers::CLEAR_MESSAGES) == Some("yes");
        queue.clear_messages(priority, regular);
        OperationResult::Success
    }

    async fn publish(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.client_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let Some(router) = self.routers.get(&message.target) else {
            return OperationResult::NotFound;
        };
        match router.publish(Some(sender.clone()), message).await {
            RouterPublishResult::OkAndWillRespond | RouterPublishResult::OkNoRespond => OperationResult::Success,
            RouterPublishResult::NoReceivers => OperationResult::NoReceivers,
            RouterPublishResult::NoBindings => OperationResult::NoBindings,
            RouterPublishResult::Disabled => OperationResult::Disabled,
        }
    }

    async fn create_router(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let method = parse_route_method(message.headers.get(headers::ROUTE_METHOD));
        let outcome = match self.routers.create(&message.target, method) {
            Ok(_) => OperationResult::Success,
            Err(crate::registry::RegistryError::Duplicate(_)) => OperationResult::Duplicate,
            Err(_) => OperationResult::Error,
        };
        if outcome == OperationResult::Success {
            self.persist_routers().await;
        }
        outcome
    }

    async fn remove_router(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        match self.routers.remove(&message.target) {
            Some(_) => {
                self.persist_routers().await;
                OperationResult::Success
            }
            None => OperationResult::NotFound,
        }
    }

    async fn create_queue_binding(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let Some(router) = self.routers.get(&message.target) else {
            return OperationResult::NotFound;
        };
        let Some(binding_name) = message.headers.get(headers::BINDING_NAME) else {
            return OperationResult::Error;
        };
        let Some(bound_queue) = message.headers.get(headers::QUEUE_NAME).map(str::to_string) else {
            return OperationResult::Error;
        };
        let Some(queue_sink) = self.queues.get_sink(&bound_queue) else {
            return OperationResult::NotFound;
        };
        let binding: Arc<dyn Binding> = Arc::new(QueueBinding::new(binding_name, 0, Interaction::None, queue_sink));
        router.add_binding(binding);
        self.persist_routers().await;
        OperationResult::Success
    }

    async fn create_direct_binding(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let Some(router) = self.routers.get(&message.target) else {
            return OperationResult::NotFound;
        };
        let Some(binding_name) = message.headers.get(headers::BINDING_NAME).map(str::to_string) else {
            return OperationResult::Error;
        };
        let route_method = parse_route_method(message.headers.get(headers::ROUTE_METHOD));
        let selector = String::from_utf8_lossy(&message.payload).to_string();
        let binding: Arc<dyn Binding> = Arc::new(DirectBinding::new(
            binding_name,
            0,
            Interaction::None,
            selector,
            route_method,
            self.clients.clone(),
        ));
        router.add_binding(binding);
        self.persist_routers().await;
        OperationResult::Success
    }

    async fn remove_binding(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.admin_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let Some(router) = self.routers.get(&message.target) else {
            return OperationResult::NotFound;
        };
        let Some(binding_name) = message.headers.get(headers::BINDING_NAME) else {
            return OperationResult::Error;
        };
        if router.remove_binding(binding_name) {
            self.persist_routers().await;
            OperationResult::Success
        } else {
            OperationResult::NotFound
        }
    }

    async fn channel_subscribe(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.client_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let channel = match self.channels.get(&message.target) {
            Some(channel) => channel,
            None => match self.channels.create(&message.target, ChannelOptionsBuilder::new().build().unwrap_or_else(|_| ChannelOptions::default())) {
                Ok(channel) => channel,
                Err(_) => return OperationResult::Error,
            },
        };
        let outcome = channel.subscribe(sender.clone()).await;
        if outcome.is_success() {
            self.clients.add_subscription(sender.id(), &message.target);
        }
        outcome
    }

    async fn channel_unsubscribe(&self, sender: &ClientRef, message: Message) -> OperationResult {
        let Some(channel) = self.channels.get(&message.target) else {
            return OperationResult::NotFound;
        };
        channel.unsubscribe(sender.id()).await;
        self.clients.remove_subscription(sender.id(), &message.target);
        OperationResult::Success
    }

    async fn peer_message(&self, sender: &ClientRef, message: Message) -> OperationResult {
        if !self.client_allows(sender, &message).await {
            return OperationResult::Unauthorized;
        }
        let recipients = self.resolve_direct_target(&message.target);
        if recipients.is_empty() {
            return OperationResult::NotFound;
        }
        let mut delivered = false;
        for client in recipients {
            if client.send(message.clone()).await {
                delivered = true;
            }
        }
        if delivered {
            OperationResult::Success
        } else {
            OperationResult::NoReceivers
        }
    }

    fn resolve_direct_target(&self, target: &str) -> Vec<ClientRef> {
        if let Some(client_type) = target.strip_prefix("@type:") {
            self.clients.by_type(client_type)
        } else if let Some(name) = target.strip_prefix("@name:") {
            self.clients.by_name(name)
        } else {
            match uuid::Uuid::parse_str(target) {
                Ok(uuid) => self.clients.get(ClientId::from_uuid(uuid)).into_iter().collect(),
                Err(_) => Vec::new(),
            }
        }
    }
}
