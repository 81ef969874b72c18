//! In-flight delivery tracking with deadline scheduling (SPEC_FULL §4.2).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::client::ClientRef;
use crate::message::QueueMessage;
use crate::util::ClientId;

/// Ack state of a tracked [`MessageDelivery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcknowledgeState {
    /// Awaiting an ack or nack from the receiver.
    Pending,
    /// A positive ack was received.
    Received,
    /// A negative ack (nack) was received.
    Failed,
    /// The deadline elapsed before any ack arrived.
    Timeout,
}

/// A single tracked attempt to hand a message to a consumer.
#[derive(Debug, Clone)]
pub struct MessageDelivery {
    /// The message as delivered.
    pub queue_message: QueueMessage,
    /// The consumer this delivery was sent to.
    pub receiver: ClientRef,
    /// Absolute deadline by which an ack must arrive, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Current ack state.
    pub acknowledge: AcknowledgeState,
}

impl MessageDelivery {
    /// Start tracking a delivery in the `Pending` state.
    pub fn new(queue_message: QueueMessage, receiver: ClientRef, deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            queue_message,
            receiver,
            deadline,
            acknowledge: AcknowledgeState::Pending,
        }
    }
}

/// Receives notification when a tracked delivery's deadline elapses without
/// an ack. Implemented by the owning [`crate::queue::Queue`] so the tracker
/// can drive the delivery-handler timeout callback and queue pipeline
/// without the two modules depending on each other's concrete types.
#[async_trait]
pub trait DeliveryTimeoutSink: Send + Sync {
    /// Called once, exactly when a tracked delivery's deadline elapses while
    /// still `Pending`. The delivery has already been removed from the
    /// tracker.
    async fn on_delivery_timeout(&self, delivery: MessageDelivery);
}

type Key = (ClientId, String);

struct Inner {
    entries: Mutex<HashMap<Key, MessageDelivery>>,
    sink: Mutex<Option<Arc<dyn DeliveryTimeoutSink>>>,
}

/// Tracks deliveries awaiting acknowledgement and arms per-delivery
/// deadlines.
///
/// Cheaply cloneable: clones share the same backing map and may be handed to
/// spawned timeout tasks.
#[derive(Clone)]
pub struct DeliveryTracker(Arc<Inner>);

impl Default for DeliveryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryTracker {
    /// Create an empty tracker with no timeout sink installed yet.
    pub fn new() -> Self {
        Self(Arc::new(Inner {
            entries: Mutex::new(HashMap::new()),
            sink: Mutex::new(None),
        }))
    }

    /// Install the sink notified on delivery timeout. A queue installs
    /// itself here once constructed, since the tracker must exist before the
    /// queue that owns it can hand out `Arc<Self>`.
    pub fn set_sink(&self, sink: Arc<dyn DeliveryTimeoutSink>) {
        *self.0.sink.lock() = Some(sink);
    }

    fn key_for(client: ClientId, message_id: &str) -> Key {
        (client, message_id.to_string())
    }

    /// Track a new delivery. If it carries a deadline, arms a timer that
    /// fires [`DeliveryTimeoutSink::on_delivery_timeout`] if the delivery is
    /// still `Pending` when the deadline elapses.
    pub fn track(&self, delivery: MessageDelivery) {
        let message_id = delivery
            .queue_message
            .message
            .id
            .clone()
            .unwrap_or_default();
        let key = Self::key_for(delivery.receiver.id(), &message_id);
        let deadline = delivery.deadline;
        self.0.entries.lock().insert(key.clone(), delivery);

        if let Some(deadline) = deadline {
            let this = self.clone();
            tokio::spawn(async move {
                let now = Utc::now();
                if deadline > now {
                    let wait = deadline - now;
                    if let Ok(std_wait) = wait.to_std() {
                        tokio::time::sleep(std_wait).await;
                    }
                }
                this.fire_timeout(key).await;
            });
        }
    }

    async fn fire_timeout(&self, key: Key) {
        let delivery = {
            let mut entries = self.0.entries.lock();
            match entries.get(&key) {
                Some(d) if d.acknowledge == AcknowledgeState::Pending => entries.remove(&key),
                _ => None,
            }
        };
        let Some(mut delivery) = delivery else {
            return;
        };
        delivery.acknowledge = AcknowledgeState::Timeout;
        let sink = self.0.sink.lock().clone();
        if let Some(sink) = sink {
            sink.on_delivery_timeout(delivery).await;
        }
    }

    /// Remove and return the tracked delivery for `(client, message_id)`, if
    /// present. Callers handling a race between ack arrival and `track`
    /// insertion retry this themselves (SPEC_FULL §4.2).
    pub fn find_and_remove(&self, client: ClientId, message_id: &str) -> Option<MessageDelivery> {
        self.0.entries.lock().remove(&Self::key_for(client, message_id))
    }

    /// Number of deliveries still awaiting an ack; used for auto-destroy checks.
    pub fn pending_count(&self) -> usize {
        self.0
            .entries
            .lock()
            .values()
            .filter(|d| d.acknowledge == AcknowledgeState::Pending)
            .count()
    }

    /// Clear every tracked delivery. Already-spawned timeout tasks observe
    /// their entry missing on fire and become no-ops.
    pub fn destroy(&self) {
        self.0.entries.lock().clear();
    }
}
