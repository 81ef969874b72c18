//! [`QueueMessage`]: the envelope a [`super::Message`] travels in once it has
//! entered a queue's store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::Decision;
use super::message::Message;
use crate::client::ClientRef;

/// Envelope wrapping a [`Message`] while it lives inside a queue
/// (SPEC_FULL §3 `QueueMessage`).
///
/// Invariants upheld by callers (enforced in debug builds via
/// [`QueueMessage::assert_invariants`]): `is_in_queue` and `is_removed` are
/// mutually exclusive; `is_sent` and `is_saved` only ever transition
/// `false -> true`, never back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// The wrapped message.
    pub message: Message,
    /// When this envelope was created.
    pub created_at: DateTime<Utc>,
    /// Optional absolute deadline after which the message times out.
    pub deadline: Option<DateTime<Utc>>,
    /// True while the message is resident in a [`crate::store::MessageStore`].
    pub is_in_queue: bool,
    /// True once the message has been handed to at least one receiver.
    pub is_sent: bool,
    /// True once the message has been permanently removed from its queue.
    pub is_removed: bool,
    /// True once `DeliveryHandler::saveMessage` has been invoked successfully.
    pub is_saved: bool,
    /// True once a producer ack/nack has been sent for this message.
    pub is_producer_ack_sent: bool,
    /// The client that produced this message, if any (weak reference by id).
    #[serde(skip)]
    pub source: Option<ClientRef>,
    /// The most recently applied delivery decision.
    pub decision: Decision,
    /// Clients this message has been delivered to so far.
    #[serde(skip)]
    pub delivery_receivers: HashSet<ClientRef>,
}

impl QueueMessage {
    /// Wrap a message that was just produced.
    pub fn new(message: Message, source: Option<ClientRef>) -> Self {
        Self {
            message,
            created_at: Utc::now(),
            deadline: None,
            is_in_queue: false,
            is_sent: false,
            is_removed: false,
            is_saved: false,
            is_producer_ack_sent: false,
            source,
            decision: Decision::default(),
            delivery_receivers: HashSet::new(),
        }
    }

    /// Mark this envelope as resident in a store.
    pub fn mark_in_queue(&mut self) {
        self.is_in_queue = true;
        self.is_removed = false;
    }

    /// Mark this envelope as permanently removed from its queue.
    pub fn mark_removed(&mut self) {
        self.is_in_queue = false;
        self.is_removed = true;
    }

    /// Record a delivery attempt to `receiver`.
    pub fn record_delivery(&mut self, receiver: ClientRef) {
        self.is_sent = true;
        self.delivery_receivers.insert(receiver);
    }

    /// True if `deadline` has passed relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Panics in debug builds if the mutual-exclusion invariant is violated.
    #[cfg(debug_assertions)]
    pub fn assert_invariants(&self) {
        debug_assert!(
            !(self.is_in_queue && self.is_removed),
            "queue message cannot be both in-queue and removed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::kind::MessageKind;
    use bytes::Bytes;

    fn sample() -> QueueMessage {
        QueueMessage::new(
            Message::new(MessageKind::QueueMessage, "orders", Bytes::new()),
            None,
        )
    }

    #[test]
    fn mark_in_queue_clears_removed() {
        let mut qm = sample();
        qm.mark_removed();
        qm.mark_in_queue();
        assert!(qm.is_in_queue);
        assert!(!qm.is_removed);
    }

    #[test]
    fn mark_removed_clears_in_queue() {
        let mut qm = sample();
        qm.mark_in_queue();
        qm.mark_removed();
        assert!(!qm.is_in_queue);
        assert!(qm.is_removed);
    }

    #[test]
    fn expiry_uses_deadline() {
        let mut qm = sample();
        let now = Utc::now();
        qm.deadline = Some(now - chrono::Duration::seconds(1));
        assert!(qm.is_expired(now));
    }
}
