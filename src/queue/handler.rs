//! `DeliveryHandler`: the per-queue policy hook invoked at every lifecycle
//! point (SPEC_FULL §6 external collaborator, §14 default implementation).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::options::QueueOptions;
use crate::client::ClientRef;
use crate::delivery::MessageDelivery;
use crate::message::{Decision, QueueMessage};

/// Context handed to a [`DeliveryHandlerFactory`] entry when a queue is
/// initialized.
#[derive(Debug, Clone)]
pub struct DeliveryHandlerBuildContext {
    /// Name of the queue being initialized.
    pub queue_name: String,
    /// The queue's resolved options.
    pub options: QueueOptions,
}

/// Policy hooks a queue consults at each stage of a message's lifecycle.
/// Every hook returns a [`Decision`] the queue pipeline applies
/// (SPEC_FULL §4.4 `applyDecision`).
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    /// Called when a message first arrives from a producer, before storage.
    async fn received_from_producer(&self, message: &QueueMessage) -> Decision;

    /// Called immediately before a message is serialized and sent to `receiver`.
    async fn begin_send(&self, message: &QueueMessage, receiver: &ClientRef) -> Decision;

    /// Veto hook consulted by round-robin eligibility scanning, in addition
    /// to connection/processing-slot checks.
    async fn can_consumer_receive(&self, receiver: &ClientRef) -> bool;

    /// Called when a send attempt to `receiver` failed at the transport layer.
    async fn consumer_receive_failed(&self, message: &QueueMessage, receiver: &ClientRef) -> Decision;

    /// Called immediately after a send attempt to `receiver` completes.
    async fn end_send(&self, message: &QueueMessage, receiver: &ClientRef, success: bool) -> Decision;

    /// Called when an ack or nack is received for a tracked delivery.
    async fn acknowledge_received(&self, message: &QueueMessage, receiver: &ClientRef, success: bool) -> Decision;

    /// Called when a tracked delivery's deadline elapses unacknowledged.
    async fn message_timed_out(&self, delivery: &MessageDelivery) -> Decision;

    /// Called to persist a message; must be idempotent (`QueueMessage::is_saved`).
    async fn save_message(&self, message: &QueueMessage) -> Decision;

    /// Called once a message is permanently removed from its queue.
    async fn message_dequeued(&self, message: &QueueMessage) -> Decision;

    /// Called when an exception propagates out of any pipeline step above.
    async fn exception_thrown(&self, message: &QueueMessage, error: &str) -> Decision;
}

/// A `DeliveryHandler` that acknowledges immediately, saves nothing, and
/// never puts messages back. Used when a queue is initialized without a
/// caller-supplied handler (SPEC_FULL §14).
#[derive(Debug, Default)]
pub struct DefaultDeliveryHandler;

#[async_trait]
impl DeliveryHandler for DefaultDeliveryHandler {
    async fn received_from_producer(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn begin_send(&self, _message: &QueueMessage, _receiver: &ClientRef) -> Decision {
        Decision::pass()
    }

    async fn can_consumer_receive(&self, _receiver: &ClientRef) -> bool {
        true
    }

    async fn consumer_receive_failed(&self, _message: &QueueMessage, _receiver: &ClientRef) -> Decision {
        Decision::pass()
    }

    async fn end_send(&self, _message: &QueueMessage, _receiver: &ClientRef, success: bool) -> Decision {
        if success {
            Decision::complete()
        } else {
            Decision::pass()
        }
    }

    async fn acknowledge_received(&self, _message: &QueueMessage, _receiver: &ClientRef, success: bool) -> Decision {
        if success {
            Decision::complete()
        } else {
            Decision::pass()
        }
    }

    async fn message_timed_out(&self, _delivery: &MessageDelivery) -> Decision {
        Decision::complete()
    }

    async fn save_message(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn message_dequeued(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn exception_thrown(&self, _message: &QueueMessage, _error: &str) -> Decision {
        Decision::pass()
    }
}

type Constructor = dyn Fn(&DeliveryHandlerBuildContext) -> Arc<dyn DeliveryHandler> + Send + Sync;

/// Named factory registry replacing the reflection-based handler lookup the
/// source relied on (SPEC_FULL §9): queues resolve their handler by the
/// `Delivery-Handler` header (default `"Default"`) through this map.
pub struct DeliveryHandlerFactory {
    constructors: RwLock<HashMap<String, Arc<Constructor>>>,
}

impl Default for DeliveryHandlerFactory {
    fn default() -> Self {
        let factory = Self {
            constructors: RwLock::new(HashMap::new()),
        };
        factory.register("Default", |_ctx| Arc::new(DefaultDeliveryHandler));
        factory
    }
}

impl DeliveryHandlerFactory {
    /// Create a factory pre-populated with the `"Default"` handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named constructor, overwriting any existing entry with the
    /// same name.
    pub fn register<F>(&self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&DeliveryHandlerBuildContext) -> Arc<dyn DeliveryHandler> + Send + Sync + 'static,
    {
        self.constructors.write().insert(name.into(), Arc::new(ctor));
    }

    /// Build a handler by name, falling back to `"Default"` if `name` is
    /// unregistered.
    pub fn build(&self, name: &str, ctx: &DeliveryHandlerBuildContext) -> Arc<dyn DeliveryHandler> {
        let constructors = self.constructors.read();
        if let Some(ctor) = constructors.get(name) {
            return ctor(ctx);
        }
        match constructors.get("Default") {
            Some(ctor) => ctor(ctx),
            None => Arc::new(DefaultDeliveryHandler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DeliveryHandlerBuildContext {
        DeliveryHandlerBuildContext {
            queue_name: "orders".to_string(),
            options: QueueOptions::default(),
        }
    }

    #[test]
    fn unregistered_name_falls_back_to_default() {
        let factory = DeliveryHandlerFactory::new();
        let _handler = factory.build("Unknown", &ctx());
    }

    #[tokio::test]
    async fn default_handler_completes_on_successful_send() {
        let handler = DefaultDeliveryHandler;
        let message = QueueMessage::new(
            crate::message::Message::new(crate::message::MessageKind::QueueMessage, "q", bytes::Bytes::new()),
            None,
        );
        let client = ClientRef::new(
            crate::util::ClientId::new(),
            "c",
            crate::client::ClientType("consumer".into()),
            Arc::new(crate::client::DisconnectedSink),
        );
        let decision = handler.end_send(&message, &client, true).await;
        assert!(decision.delete);
    }
}
