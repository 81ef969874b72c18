//! A client's subscription to one queue (SPEC_FULL §3 `QueueClient`).

use chrono::{DateTime, Utc};

use crate::client::ClientRef;
use crate::message::QueueMessage;

/// One `(queue, client)` subscription pair. Exactly one exists per pair at a
/// time; registries enforce this by keying on the client's id.
pub struct QueueClient {
    /// The subscribed client.
    pub client: ClientRef,
    /// When this client joined the queue.
    pub joined_at: DateTime<Utc>,
    /// The delivery this client is currently processing, if any.
    pub currently_processing: Option<QueueMessage>,
    /// Deadline by which `currently_processing` must be acked, if any.
    pub process_deadline: Option<DateTime<Utc>>,
}

impl QueueClient {
    /// Create a fresh subscription record with no delivery in flight.
    pub fn new(client: ClientRef) -> Self {
        Self {
            client,
            joined_at: Utc::now(),
            currently_processing: None,
            process_deadline: None,
        }
    }

    /// Whether this client is eligible to receive a new delivery right now:
    /// connected and not already processing an un-expired delivery
    /// (SPEC_FULL §4.3 round-robin eligibility rule).
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        if !self.client.is_connected() {
            return false;
        }
        match (&self.currently_processing, self.process_deadline) {
            (None, _) => true,
            (Some(_), Some(deadline)) => deadline < now,
            (Some(_), None) => false,
        }
    }

    /// Record that `message` is now being processed, with an optional
    /// ack deadline.
    pub fn begin_processing(&mut self, message: QueueMessage, deadline: Option<DateTime<Utc>>) {
        self.currently_processing = Some(message);
        self.process_deadline = deadline;
    }

    /// Clear the in-flight delivery, e.g. after an ack or timeout.
    pub fn clear_processing(&mut self) {
        self.currently_processing = None;
        self.process_deadline = None;
    }
}
