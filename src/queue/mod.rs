//! Per-queue message routing and delivery (SPEC_FULL §4.4).

pub mod client;
pub mod handler;
pub mod options;
pub mod status;
pub mod strategy;

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;

pub use client::QueueClient;
pub use handler::{DefaultDeliveryHandler, DeliveryHandler, DeliveryHandlerBuildContext, DeliveryHandlerFactory};
pub use options::{AcknowledgeMode, AutoDestroy, QueueOptions, QueueOptionsBuilder, QueueOptionsError, QueueType};
pub use status::QueueStatus;
pub use strategy::{PullStrategy, PushStrategy, QueueDecisionSink, QueueStrategy, RoundRobinStrategy, StrategyContext};

use crate::client::ClientRef;
use crate::cluster::{ClusterCoordinator, NoopClusterCoordinator};
use crate::delivery::{DeliveryTimeoutSink, DeliveryTracker, MessageDelivery};
use crate::headers::strip_internal_headers;
use crate::message::{Decision, Message, PutBack, QueueMessage, Transmission};
use crate::monitoring::{Monitor, NoopMonitor, QueueEvent, QueueEventKind};
use crate::result::OperationResult;
use crate::store::MessageStore;
use crate::util::{ClientId, DefaultIdGenerator, IdGenerator};

fn strategy_for(queue_type: QueueType) -> Arc<dyn QueueStrategy> {
    match queue_type {
        QueueType::Push => Arc::new(PushStrategy),
        QueueType::RoundRobin => Arc::new(RoundRobinStrategy::new()),
        QueueType::Pull => Arc::new(PullStrategy),
    }
}

/// Monitor-erased view of a [`Queue`], so [`crate::router::binding::QueueBinding`]
/// and the queue registry can hold queues without fixing a monitor type.
#[async_trait]
pub trait QueueSink: Send + Sync {
    /// See [`Queue::push`].
    async fn push(&self, message: Message, source: Option<ClientRef>) -> OperationResult;

    /// This queue's name.
    fn name(&self) -> &str;

    /// Current lifecycle status.
    fn status(&self) -> QueueStatus;
}

#[async_trait]
impl<M: Monitor<QueueEvent> + 'static> QueueSink for Queue<M> {
    async fn push(&self, message: Message, source: Option<ClientRef>) -> OperationResult {
        Queue::push(self, message, source).await
    }

    fn name(&self) -> &str {
        Queue::name(self)
    }

    fn status(&self) -> QueueStatus {
        Queue::status(self)
    }
}

/// A single named message queue: store, subscriber set, distribution
/// strategy, and the pipeline that ties them together (SPEC_FULL §4.4).
///
/// Generic over its [`Monitor`] so a broker can run with [`NoopMonitor`] in
/// hot paths or swap in [`crate::monitoring::InMemoryMonitor`] for
/// observability, without the queue itself depending on a concrete monitor.
pub struct Queue<M: Monitor<QueueEvent> + 'static = NoopMonitor<QueueEvent>> {
    name: String,
    options: RwLock<QueueOptions>,
    status: RwLock<QueueStatus>,
    store: MessageStore,
    clients: DashMap<ClientId, QueueClient>,
    order: RwLock<Vec<ClientId>>,
    strategy: RwLock<Arc<dyn QueueStrategy>>,
    handler: RwLock<Arc<dyn DeliveryHandler>>,
    tracker: DeliveryTracker,
    id_generator: Box<dyn IdGenerator>,
    monitor: M,
    cluster: Arc<dyn ClusterCoordinator>,
    triggering: AtomicBool,
    destroyed: AtomicI64,
    self_ref: RwLock<Weak<Self>>,
}

impl<M: Monitor<QueueEvent> + 'static> std::fmt::Debug for Queue<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<M: Monitor<QueueEvent> + 'static> Queue<M> {
    /// Construct a queue and wire its [`DeliveryTracker`] back to itself for
    /// timeout notifications. `handler` defaults to [`DefaultDeliveryHandler`]
    /// when `factory` does not resolve `options.delivery_handler_name`.
    pub fn new(name: impl Into<String>, options: QueueOptions, factory: &DeliveryHandlerFactory, monitor: M) -> Arc<Self> {
        Self::with_cluster(name, options, factory, monitor, Arc::new(NoopClusterCoordinator))
    }

    /// As [`Queue::new`], replicating through `cluster` instead of the
    /// standalone default.
    pub fn with_cluster(
        name: impl Into<String>,
        options: QueueOptions,
        factory: &DeliveryHandlerFactory,
        monitor: M,
        cluster: Arc<dyn ClusterCoordinator>,
    ) -> Arc<Self> {
        let name = name.into();
        let handler = factory.build(
            &options.delivery_handler_name,
            &DeliveryHandlerBuildContext {
                queue_name: name.clone(),
                options: options.clone(),
            },
        );
        let strategy = strategy_for(options.queue_type);
        let queue = Arc::new(Self {
            name,
            status: RwLock::new(QueueStatus::NotInitialized),
            strategy: RwLock::new(strategy),
            handler: RwLock::new(handler),
            tracker: DeliveryTracker::new(),
            options: RwLock::new(options),
            store: MessageStore::new(),
            clients: DashMap::new(),
            order: RwLock::new(Vec::new()),
            id_generator: Box::new(DefaultIdGenerator::new()),
            monitor,
            cluster,
            triggering: AtomicBool::new(false),
            destroyed: AtomicI64::new(0),
            self_ref: RwLock::new(Weak::new()),
        });
        *queue.self_ref.write() = Arc::downgrade(&queue);
        queue.tracker.set_sink(queue.clone() as Arc<dyn DeliveryTimeoutSink>);
        queue
    }

    /// This queue's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle status.
    pub fn status(&self) -> QueueStatus {
        *self.status.read()
    }

    /// A clone of this queue's current configuration.
    pub fn options_snapshot(&self) -> QueueOptions {
        self.options.read().clone()
    }

    /// Number of messages currently resident in the store.
    pub fn message_count(&self) -> usize {
        self.store.count_all()
    }

    /// Number of subscribed clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Clear the priority and/or regular sequence (SPEC_FULL §4.8 `ClearMessages`).
    pub fn clear_messages(&self, priority: bool, regular: bool) {
        if priority {
            self.store.clear_priority();
        }
        if regular {
            self.store.clear_regular();
        }
    }

    async fn emit(&self, kind: QueueEventKind, message_id: Option<String>) {
        let _ = self
            .monitor
            .record(QueueEvent {
                timestamp: Utc::now(),
                target: self.name.clone(),
                message_id,
                event_kind: kind,
                metadata: Default::default(),
            })
            .await;
    }

    /// Request a transition to `next`. Running transitions from
    /// `NotInitialized` happen implicitly on the first accepted push.
    pub async fn set_status(&self, next: QueueStatus) -> bool {
        let current = *self.status.read();
        if !current.can_transition_to(next) {
            return false;
        }
        *self.status.write() = next;
        self.emit(
            QueueEventKind::StatusChanged {
                from: format!("{current:?}"),
                to: format!("{next:?}"),
            },
            None,
        )
        .await;
        self.cluster.send_queue_updated(&self.name).await;
        true
    }

    fn ctx<'a>(&'a self, strategy_opts: &'a QueueOptions, handler: &'a Arc<dyn DeliveryHandler>) -> StrategyContext<'a> {
        StrategyContext {
            store: &self.store,
            clients: &self.clients,
            order: &self.order,
            tracker: &self.tracker,
            handler,
            options: strategy_opts,
            decision_sink: self,
        }
    }

    /// Accept a message from a producer (SPEC_FULL §4.4 push pipeline).
    pub async fn push(&self, mut message: Message, source: Option<ClientRef>) -> OperationResult {
        let status = *self.status.read();
        if !status.accepts_push() {
            return OperationResult::StatusNotSupported;
        }
        if status == QueueStatus::NotInitialized {
            self.set_status(QueueStatus::Running).await;
        }

        let options = self.options.read().clone();
        if let Some(limit) = options.message_size_limit {
            if message.approximate_size() > limit {
                return OperationResult::LimitExceeded;
            }
        }
        if let Some(limit) = options.message_limit {
            if self.store.count_all() >= limit {
                return OperationResult::LimitExceeded;
            }
        }

        message.ensure_id(self.id_generator.as_ref());
        strip_internal_headers(&mut message.headers);
        let mut qm = QueueMessage::new(message, source);
        if let Some(ttl) = options.message_timeout {
            qm.deadline = Some(Utc::now() + ttl);
        }

        if self.cluster.state() == crate::cluster::NodeState::Main
            && !self.cluster.send_queue_message(&self.name, &qm.message).await
        {
            return OperationResult::Error;
        }

        let handler = self.handler.read().clone();
        let decision = handler.received_from_producer(&qm).await;
        if !self.apply_decision(qm.clone(), decision).await {
            return OperationResult::Error;
        }

        self.emit(QueueEventKind::Push, qm.message.id.clone()).await;

        let trigger_supported = self.strategy.read().trigger_supported();
        let outcome = if options.queue_type == QueueType::Pull {
            self.store.put(qm.clone());
            let strategy = self.strategy.read().clone();
            strategy.push(&self.ctx(&options, &handler), qm).await
        } else if trigger_supported {
            // Trigger-driven strategies (round-robin) always go through the
            // store; the drain runs in the background so a burst of pushes
            // isn't serialised behind `delay_between_messages` (SPEC_FULL
            // §8 S4). The reentrancy guard in `trigger` ensures only one
            // drain loop runs per queue regardless of how many pushes spawn one.
            self.store.put(qm);
            let weak = self.self_ref.read().clone();
            tokio::spawn(async move {
                if let Some(queue) = weak.upgrade() {
                    queue.trigger().await;
                }
            });
            OperationResult::Success
        } else {
            let strategy = self.strategy.read().clone();
            strategy.push(&self.ctx(&options, &handler), qm).await
        };

        self.maybe_auto_destroy().await;
        outcome
    }

    /// Serve an explicit pull request for up to `max` messages (Pull queues).
    pub async fn pull(&self, client: ClientId, max: usize) -> Vec<QueueMessage> {
        let options = self.options.read().clone();
        let handler = self.handler.read().clone();
        let strategy = self.strategy.read().clone();
        let batch = strategy.pull(&self.ctx(&options, &handler), client, max).await;
        for qm in &batch {
            self.emit(QueueEventKind::Dequeued, qm.message.id.clone()).await;
        }
        self.maybe_auto_destroy().await;
        batch
    }

    /// Subscribe `client` to this queue.
    pub async fn subscribe(&self, client: ClientRef) {
        let id = client.id();
        self.clients.insert(id, QueueClient::new(client));
        self.order.write().push(id);
        self.trigger().await;
    }

    /// Remove `client`'s subscription, e.g. on explicit unsubscribe or
    /// connection loss (SPEC_FULL §3 synchronous back-reference pruning).
    pub async fn unsubscribe(&self, client: ClientId) {
        self.clients.remove(&client);
        self.order.write().retain(|id| *id != client);
        self.maybe_auto_destroy().await;
    }

    /// Record an ack (`success = true`) or nack for `message_id` delivered to
    /// `client`.
    ///
    /// A lookup miss is retried after 1ms and again after 3ms before giving
    /// up, since an ack can race the strategy's own `tracker.track` call
    /// (SPEC_FULL §4.2).
    pub async fn acknowledge(&self, client: ClientId, message_id: &str, success: bool) -> OperationResult {
        let mut found = self.tracker.find_and_remove(client, message_id);
        for backoff_ms in [1u64, 3] {
            if found.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
            found = self.tracker.find_and_remove(client, message_id);
        }
        let Some(delivery) = found else {
            return OperationResult::NotFound;
        };
        let handler = self.handler.read().clone();
        let decision = handler
            .acknowledge_received(&delivery.queue_message, &delivery.receiver, success)
            .await;
        if let Some(mut entry) = self.clients.get_mut(&client) {
            entry.clear_processing();
        }
        self.emit(
            if success { QueueEventKind::Ack } else { QueueEventKind::Nack { reason: None } },
            Some(message_id.to_string()),
        )
        .await;
        self.apply_decision(delivery.queue_message, decision).await;
        self.maybe_auto_destroy().await;
        self.trigger().await;
        OperationResult::Success
    }

    /// Re-run the active strategy against whatever is resident in the store,
    /// one message at a time, until the store is empty, the strategy can't
    /// deliver, or the strategy doesn't drain the store at all. Invoked after
    /// a subscribe or an ack frees a consumer slot.
    async fn trigger(&self) {
        if self.triggering.swap(true, Ordering::AcqRel) {
            return;
        }
        let options = self.options.read().clone();
        let handler = self.handler.read().clone();
        loop {
            let strategy = self.strategy.read().clone();
            if !strategy.trigger_supported() {
                break;
            }
            let Some(qm) = self.store.get_next(true, false) else {
                break;
            };
            let outcome = strategy.push(&self.ctx(&options, &handler), qm).await;
            if outcome != OperationResult::Success {
                break;
            }
            if !options.delay_between_messages.is_zero() {
                if let Ok(delay) = options.delay_between_messages.to_std() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        self.triggering.store(false, Ordering::Release);
    }

    /// Apply a [`Decision`] returned by a delivery-handler hook: persist,
    /// remove, put back, and/or send a producer ack/nack as instructed
    /// (SPEC_FULL §4.4 `applyDecision`). Returns `false` if the decision
    /// interrupts further processing.
    async fn apply_decision_inner(&self, mut message: QueueMessage, decision: Decision) -> bool {
        message.decision = message.decision.combine(decision);
        let combined = message.decision;

        if combined.save {
            let handler = self.handler.read().clone();
            let save_decision = handler.save_message(&message).await;
            message.decision = message.decision.combine(save_decision);
            message.is_saved = true;
        }

        match combined.put_back {
            PutBack::No => {}
            PutBack::Priority => {
                message.message.high_priority = true;
                let options = self.options.read().clone();
                self.cluster.send_put_back(&self.name, &message, &combined).await;
                self.schedule_put_back(message.clone(), options.put_back_delay);
                self.emit(QueueEventKind::PutBack, message.message.id.clone()).await;
            }
            PutBack::Regular => {
                message.message.high_priority = false;
                let options = self.options.read().clone();
                self.cluster.send_put_back(&self.name, &message, &combined).await;
                self.schedule_put_back(message.clone(), options.put_back_delay);
                self.emit(QueueEventKind::PutBack, message.message.id.clone()).await;
            }
        }

        if combined.delete {
            message.mark_removed();
            let handler = self.handler.read().clone();
            let _ = handler.message_dequeued(&message).await;
            if let Some(id) = &message.message.id {
                self.cluster.send_message_removal(&self.name, id).await;
            }
        }

        if combined.transmission != Transmission::None {
            if let Some(source) = message.source.clone() {
                let ack_kind = if combined.transmission == Transmission::Successful {
                    crate::message::MessageKind::Ack
                } else {
                    crate::message::MessageKind::Event
                };
                let mut ack = Message::new(ack_kind, self.name.clone(), bytes::Bytes::new());
                ack.id = message.message.id.clone();
                let _ = source.send(ack).await;
            }
            message.is_producer_ack_sent = true;
        }

        !combined.interrupt
    }

    fn schedule_put_back(&self, message: QueueMessage, delay: chrono::Duration) {
        if delay.is_zero() {
            self.store.put_front(message);
            return;
        }
        let Ok(std_delay) = delay.to_std() else {
            self.store.put_front(message);
            return;
        };
        let weak = self.self_ref.read().clone();
        tokio::spawn(async move {
            tokio::time::sleep(std_delay).await;
            if let Some(queue) = weak.upgrade() {
                queue.store.put_front(message);
                queue.trigger().await;
            }
        });
    }

    async fn maybe_auto_destroy(&self) {
        let policy = self.options.read().auto_destroy;
        if policy == AutoDestroy::Disabled {
            return;
        }
        let no_consumers = self.clients.is_empty();
        let no_messages = self.store.count_all() == 0 && self.tracker.pending_count() == 0;
        let should_destroy = match policy {
            AutoDestroy::Disabled => false,
            AutoDestroy::NoConsumers => no_consumers,
            AutoDestroy::NoMessages => no_messages,
            AutoDestroy::Empty => no_consumers && no_messages,
        };
        if should_destroy && self.destroyed.swap(1, Ordering::AcqRel) == 0 {
            *self.status.write() = QueueStatus::Destroyed;
            self.store.clear_all();
            self.tracker.destroy();
            self.emit(QueueEventKind::AutoDestroyed, None).await;
            self.cluster.send_queue_removed(&self.name).await;
        }
    }
}

#[async_trait]
impl<M: Monitor<QueueEvent> + 'static> QueueDecisionSink for Queue<M> {
    async fn apply_decision(&self, message: QueueMessage, decision: Decision) -> bool {
        self.apply_decision_inner(message, decision).await
    }
}

#[async_trait]
impl<M: Monitor<QueueEvent> + 'static> DeliveryTimeoutSink for Queue<M> {
    async fn on_delivery_timeout(&self, delivery: MessageDelivery) {
        self.emit(QueueEventKind::Timeout, delivery.queue_message.message.id.clone()).await;
        let handler = self.handler.read().clone();
        let decision = handler.message_timed_out(&delivery).await;
        if let Some(mut entry) = self.clients.get_mut(&delivery.receiver.id()) {
            entry.clear_processing();
        }
        self.apply_decision_inner(delivery.queue_message, decision).await;
        self.maybe_auto_destroy().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientType, DisconnectedSink};
    use crate::message::MessageKind;
    use crate::monitoring::NoopMonitor;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl crate::client::ClientSink for RecordingSink {
        async fn send(&self, message: Message) -> bool {
            self.0.lock().unwrap().push(message.target.clone());
            true
        }
        fn is_connected(&self) -> bool {
            true
        }
    }

    fn factory() -> DeliveryHandlerFactory {
        DeliveryHandlerFactory::new()
    }

    #[tokio::test]
    async fn push_without_subscribers_reports_no_consumers() {
        let queue = Queue::new("orders", QueueOptions::default(), &factory(), NoopMonitor::default());
        let message = Message::new(MessageKind::QueueMessage, "orders", Bytes::new());
        let outcome = queue.push(message, None).await;
        assert_eq!(outcome, OperationResult::NoConsumers);
    }

    #[tokio::test]
    async fn push_broadcasts_to_connected_subscriber() {
        let queue = Queue::new("orders", QueueOptions::default(), &factory(), NoopMonitor::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let client = ClientRef::new(ClientId::new(), "c", ClientType("consumer".into()), Arc::new(RecordingSink(log.clone())));
        queue.subscribe(client).await;

        let message = Message::new(MessageKind::QueueMessage, "orders", Bytes::new());
        let outcome = queue.push(message, None).await;
        assert_eq!(outcome, OperationResult::Success);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn paused_queue_rejects_push() {
        let queue = Queue::new("orders", QueueOptions::default(), &factory(), NoopMonitor::default());
        assert!(queue.set_status(QueueStatus::Running).await);
        assert!(queue.set_status(QueueStatus::Paused).await);
        let message = Message::new(MessageKind::QueueMessage, "orders", Bytes::new());
        let outcome = queue.push(message, None).await;
        assert_eq!(outcome, OperationResult::StatusNotSupported);
    }

    #[tokio::test]
    async fn pull_queue_drains_on_demand() {
        let options = QueueOptionsBuilder::new()
            .queue_type(QueueType::Pull)
            .build()
            .unwrap();
        let queue = Queue::new("jobs", options, &factory(), NoopMonitor::default());
        let client = ClientRef::new(ClientId::new(), "c", ClientType("consumer".into()), Arc::new(DisconnectedSink));
        let id = client.id();
        queue.subscribe(client).await;

        for _ in 0..3 {
            let message = Message::new(MessageKind::QueueMessage, "jobs", Bytes::new());
            queue.push(message, None).await;
        }
        let batch = queue.pull(id, 2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(queue.message_count(), 1);
    }

    #[tokio::test]
    async fn auto_destroy_on_no_consumers_tears_down_queue() {
        let options = QueueOptionsBuilder::new()
            .auto_destroy(AutoDestroy::NoConsumers)
            .build()
            .unwrap();
        let queue = Queue::new("ephemeral", options, &factory(), NoopMonitor::default());
        let client = ClientRef::new(ClientId::new(), "c", ClientType("consumer".into()), Arc::new(DisconnectedSink));
        let id = client.id();
        queue.subscribe(client).await;
        queue.unsubscribe(id).await;
        assert_eq!(queue.status(), QueueStatus::Destroyed);
    }

    #[tokio::test]
    async fn auto_destroy_empty_waits_for_clients_store_and_pending_deliveries() {
        let options = QueueOptionsBuilder::new()
            .queue_type(QueueType::RoundRobin)
            .acknowledge(AcknowledgeMode::Wait)
            .ack_timeout(chrono::Duration::milliseconds(50))
            .auto_destroy(AutoDestroy::Empty)
            .build()
            .unwrap();
        let queue = Queue::new("ephemeral", options, &factory(), NoopMonitor::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let client = ClientRef::new(ClientId::new(), "c", ClientType("consumer".into()), Arc::new(RecordingSink(log.clone())));
        let id = client.id();
        queue.subscribe(client).await;

        let message = Message::new(MessageKind::QueueMessage, "ephemeral", Bytes::new());
        queue.push(message, None).await;
        // Give the background trigger loop a moment to hand the message off.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(queue.message_count(), 0);

        // Clients and store are both empty, but the delivery is still
        // pending an ack: auto-destroy must not fire yet.
        queue.unsubscribe(id).await;
        assert_eq!(queue.status(), QueueStatus::Running);

        // Once the ack deadline elapses with no ack, the pending delivery
        // clears and auto-destroy can finally run.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(queue.status(), QueueStatus::Destroyed);
    }

    #[tokio::test]
    async fn acknowledge_unknown_delivery_is_not_found() {
        let queue = Queue::new("orders", QueueOptions::default(), &factory(), NoopMonitor::default());
        let outcome = queue.acknowledge(ClientId::new(), "missing", true).await;
        assert_eq!(outcome, OperationResult::NotFound);
    }
}
