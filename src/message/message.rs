//! The wire-level message carrier (SPEC_FULL §3 `Message`).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::headers::HeaderMap;
use super::kind::MessageKind;
use crate::util::IdGenerator;

/// A single message moving through the broker.
///
/// `id` is assigned on first enqueue if absent (see [`Message::ensure_id`]);
/// generators must produce unique, lexically sortable ids so that a lexical
/// sort of ids approximately recovers creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id, assigned lazily via [`Message::ensure_id`].
    pub id: Option<String>,
    /// What this message represents on the wire.
    pub kind: MessageKind,
    /// Destination name: a queue name, router name, channel name, or client selector.
    pub target: String,
    /// Opaque application content-type tag.
    pub content_type: u16,
    /// Whether this message should be stored/delivered ahead of regular messages.
    pub high_priority: bool,
    /// Whether the sender expects a response frame.
    pub wait_response: bool,
    /// Ordered headers; internal routing headers are stripped before delivery.
    pub headers: HeaderMap,
    /// Opaque application payload.
    pub payload: Bytes,
}

impl Message {
    /// Build a new message with empty headers and no id.
    pub fn new(kind: MessageKind, target: impl Into<String>, payload: Bytes) -> Self {
        Self {
            id: None,
            kind,
            target: target.into(),
            content_type: 0,
            high_priority: false,
            wait_response: false,
            headers: HeaderMap::new(),
            payload,
        }
    }

    /// Assign a fresh id from `generator` if one is not already set.
    ///
    /// Returns the id now present on the message (existing or freshly minted).
    pub fn ensure_id(&mut self, generator: &dyn IdGenerator) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        let id = generator.next_id();
        self.id = Some(id.clone());
        id
    }

    /// Approximate on-wire size used for `messageSizeLimit` enforcement.
    pub fn approximate_size(&self) -> usize {
        self.payload.len()
            + self.target.len()
            + self
                .headers
                .iter()
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::DefaultIdGenerator;

    #[test]
    fn ensure_id_is_idempotent() {
        let gen = DefaultIdGenerator::new();
        let mut m = Message::new(MessageKind::QueueMessage, "orders", Bytes::new());
        let first = m.ensure_id(&gen);
        let second = m.ensure_id(&gen);
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_id_preserves_existing() {
        let gen = DefaultIdGenerator::new();
        let mut m = Message::new(MessageKind::QueueMessage, "orders", Bytes::new());
        m.id = Some("explicit-id".to_string());
        assert_eq!(m.ensure_id(&gen), "explicit-id");
    }

    #[test]
    fn approximate_size_counts_payload_and_headers() {
        let mut m = Message::new(MessageKind::QueueMessage, "orders", Bytes::from_static(b"hi"));
        m.headers.insert("k", "v");
        assert_eq!(m.approximate_size(), 2 + "orders".len() + 1 + 1);
    }
}
