//! The router itself (SPEC_FULL §4.5).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::client::ClientRef;
use crate::message::Message;
use crate::monitoring::{Monitor, NoopMonitor, RouterEvent, RouterEventKind};
use crate::result::RouterPublishResult;

use super::binding::{Binding, BindingSnapshot, Interaction};
use super::RouteMethod;

/// A router's configuration and binding set, independent of traffic flowing
/// through it (SPEC_FULL §6 persisted router config).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSnapshot {
    /// This router's name.
    pub name: String,
    /// Current routing policy.
    pub method: RouteMethod,
    /// Whether this router currently accepts publishes.
    pub is_enabled: bool,
    /// This router's bindings, priority order.
    pub bindings: Vec<BindingSnapshot>,
}

/// Publishes a message across a priority-ordered set of [`Binding`]s under
/// one [`RouteMethod`] (SPEC_FULL §4.5).
pub struct Router<M: Monitor<RouterEvent> + 'static = NoopMonitor<RouterEvent>> {
    name: String,
    enabled: RwLock<bool>,
    method: RwLock<RouteMethod>,
    bindings: RwLock<Vec<Arc<dyn Binding>>>,
    cursor: AtomicUsize,
    monitor: M,
}

impl<M: Monitor<RouterEvent> + 'static> Router<M> {
    /// Create an enabled router under `method`.
    pub fn new(name: impl Into<String>, method: RouteMethod, monitor: M) -> Self {
        Self {
            name: name.into(),
            enabled: RwLock::new(true),
            method: RwLock::new(method),
            bindings: RwLock::new(Vec::new()),
            cursor: AtomicUsize::new(0),
            monitor,
        }
    }

    /// This router's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this router currently accepts publishes.
    pub fn is_enabled(&self) -> bool {
        *self.enabled.read()
    }

    /// Enable or disable this router.
    pub fn set_enabled(&self, enabled: bool) {
        *self.enabled.write() = enabled;
    }

    /// Current routing policy.
    pub fn method(&self) -> RouteMethod {
        *self.method.read()
    }

    /// Change the routing policy.
    pub fn set_method(&self, method: RouteMethod) {
        *self.method.write() = method;
    }

    /// Insert `binding`, keeping the binding list sorted by descending
    /// priority; ties keep insertion order (SPEC_FULL §4.5).
    pub fn add_binding(&self, binding: Arc<dyn Binding>) {
        let mut bindings = self.bindings.write();
        let position = bindings.partition_point(|existing| existing.priority() >= binding.priority());
        bindings.insert(position, binding);
    }

    /// Remove a binding by name. Returns whether one was found.
    pub fn remove_binding(&self, name: &str) -> bool {
        let mut bindings = self.bindings.write();
        let before = bindings.len();
        bindings.retain(|binding| binding.name() != name);
        bindings.len() != before
    }

    /// Number of bindings currently attached.
    pub fn binding_count(&self) -> usize {
        self.bindings.read().len()
    }

    /// This router's current configuration and binding set, for persisting
    /// to the routers-file (SPEC_FULL §6).
    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            name: self.name.clone(),
            method: self.method(),
            is_enabled: self.is_enabled(),
            bindings: self.bindings.read().iter().map(|binding| binding.snapshot()).collect(),
        }
    }

    async fn emit(&self, kind: RouterEventKind) {
        let _ = self
            .monitor
            .record(RouterEvent {
                timestamp: Utc::now(),
                target: self.name.clone(),
                event_kind: kind,
                metadata: Default::default(),
            })
            .await;
    }

    /// Publish `message` through this router's bindings under its current
    /// routing policy (SPEC_FULL §4.5).
    pub async fn publish(&self, sender: Option<ClientRef>, message: Message) -> RouterPublishResult {
        if !self.is_enabled() {
            return RouterPublishResult::Disabled;
        }
        let bindings = self.bindings.read().clone();
        if bindings.is_empty() {
            return RouterPublishResult::NoBindings;
        }

        let result = match self.method() {
            RouteMethod::Distribute => self.publish_distribute(&bindings, sender, message).await,
            RouteMethod::OnlyFirst => self.publish_only_first(&bindings, sender, message).await,
            RouteMethod::RoundRobin => self.publish_round_robin(&bindings, sender, message).await,
        };
        if result == RouterPublishResult::NoReceivers {
            self.emit(RouterEventKind::NoReceivers).await;
        }
        result
    }

    async fn publish_distribute(
        &self,
        bindings: &[Arc<dyn Binding>],
        sender: Option<ClientRef>,
        message: Message,
    ) -> RouterPublishResult {
        let mut any_sent = false;
        let mut will_respond = false;
        for binding in bindings {
            if binding.send(sender.clone(), message.clone()).await {
                any_sent = true;
                will_respond |= binding.interaction() != Interaction::None;
                self.emit(RouterEventKind::Published { binding: binding.name().to_string() }).await;
            } else {
                self.emit(RouterEventKind::BindingFailed { binding: binding.name().to_string() }).await;
            }
        }
        if will_respond {
            RouterPublishResult::OkAndWillRespond
        } else if any_sent {
            RouterPublishResult::OkNoRespond
        } else {
            RouterPublishResult::NoReceivers
        }
    }

    async fn publish_only_first(
        &self,
        bindings: &[Arc<dyn Binding>],
        sender: Option<ClientRef>,
        message: Message,
    ) -> RouterPublishResult {
        for binding in bindings {
            if binding.send(sender.clone(), message.clone()).await {
                self.emit(RouterEventKind::Published { binding: binding.name().to_string() }).await;
                return if binding.interaction() != Interaction::None {
                    RouterPublishResult::OkAndWillRespond
                } else {
                    RouterPublishResult::OkNoRespond
                };
            }
            self.emit(RouterEventKind::BindingFailed { binding: binding.name().to_string() }).await;
        }
        RouterPublishResult::NoReceivers
    }

    async fn publish_round_robin(
        &self,
        bindings: &[Arc<dyn Binding>],
        sender: Option<ClientRef>,
        message: Message,
    ) -> RouterPublishResult {
        let count = bindings.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % count;
        for offset in 0..count {
            let binding = &bindings[(start + offset) % count];
            if binding.send(sender.clone(), message.clone()).await {
                self.emit(RouterEventKind::Published { binding: binding.name().to_string() }).await;
                return if binding.interaction() != Interaction::None {
                    RouterPublishResult::OkAndWillRespond
                } else {
                    RouterPublishResult::OkNoRespond
                };
            }
            self.emit(RouterEventKind::BindingFailed { binding: binding.name().to_string() }).await;
        }
        RouterPublishResult::NoReceivers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use crate::monitoring::NoopMonitor;
    use crate::queue::{DeliveryHandlerFactory, Queue, QueueOptions};
    use crate::router::QueueBinding;
    use bytes::Bytes;

    fn router(method: RouteMethod) -> Router<NoopMonitor<RouterEvent>> {
        Router::new("r", method, NoopMonitor::default())
    }

    fn queue_binding(name: &str, priority: i32) -> Arc<dyn Binding> {
        let queue = Queue::new(name, QueueOptions::default(), &DeliveryHandlerFactory::new(), crate::monitoring::NoopMonitor::default());
        Arc::new(QueueBinding::new(name, priority, Interaction::None, queue))
    }

    #[tokio::test]
    async fn publish_with_no_bindings_reports_no_bindings() {
        let router = router(RouteMethod::Distribute);
        let message = Message::new(MessageKind::Event, "r", Bytes::new());
        assert_eq!(router.publish(None, message).await, RouterPublishResult::NoBindings);
    }

    #[tokio::test]
    async fn disabled_router_refuses_publish() {
        let router = router(RouteMethod::Distribute);
        router.add_binding(queue_binding("q1", 0));
        router.set_enabled(false);
        let message = Message::new(MessageKind::Event, "r", Bytes::new());
        assert_eq!(router.publish(None, message).await, RouterPublishResult::Disabled);
    }

    #[tokio::test]
    async fn bindings_with_no_consumers_report_no_receivers() {
        let router = router(RouteMethod::Distribute);
        router.add_binding(queue_binding("q1", 0));
        router.add_binding(queue_binding("q2", 0));
        let message = Message::new(MessageKind::Event, "r", Bytes::new());
        assert_eq!(router.publish(None, message).await, RouterPublishResult::NoReceivers);
    }

    #[test]
    fn bindings_are_kept_priority_sorted() {
        let router = router(RouteMethod::OnlyFirst);
        router.add_binding(queue_binding("low", 1));
        router.add_binding(queue_binding("high", 10));
        router.add_binding(queue_binding("mid", 5));
        assert_eq!(router.binding_count(), 3);
    }

    fn pull_queue_binding(name: &str, priority: i32) -> (Arc<dyn Binding>, Arc<Queue<NoopMonitor<crate::monitoring::QueueEvent>>>) {
        let options = crate::queue::QueueOptionsBuilder::new().queue_type(crate::queue::QueueType::Pull).build().unwrap();
        let queue = Queue::new(name, options, &DeliveryHandlerFactory::new(), crate::monitoring::NoopMonitor::default());
        let binding: Arc<dyn Binding> = Arc::new(QueueBinding::new(name, priority, Interaction::None, queue.clone()));
        (binding, queue)
    }

    #[tokio::test]
    async fn distribute_delivers_exactly_once_per_binding_per_publish() {
        let router = router(RouteMethod::Distribute);
        let (b1, q1) = pull_queue_binding("q1", 5);
        let (b2, q2) = pull_queue_binding("q2", 10);
        router.add_binding(b1);
        router.add_binding(b2);

        for _ in 0..4 {
            let message = Message::new(MessageKind::Event, "r", Bytes::new());
            assert_eq!(router.publish(None, message).await, RouterPublishResult::OkNoRespond);
        }
        assert_eq!(q1.message_count(), 4);
        assert_eq!(q2.message_count(), 4);
    }

    #[test]
    fn remove_binding_by_name() {
        let router = router(RouteMethod::Distribute);
        router.add_binding(queue_binding("q1", 0));
        assert!(router.remove_binding("q1"));
        assert_eq!(router.binding_count(), 0);
        assert!(!router.remove_binding("q1"));
    }
}
