//! Discriminant carried by every [`super::Message`].

use serde::{Deserialize, Serialize};

/// What a [`super::Message`] represents on the wire.
///
/// The dispatcher switches on this (together with `contentType`) to decide
/// which subsystem handles an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// A message bound for a named queue.
    QueueMessage,
    /// A message addressed directly to one or more clients.
    DirectMessage,
    /// A response to a prior message that had `waitResponse` set.
    Response,
    /// A positive or negative acknowledgement of a delivered message.
    Ack,
    /// A broadcast on a channel.
    Event,
    /// A server- or client-originated control frame not covered above.
    Other,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::QueueMessage
    }
}
