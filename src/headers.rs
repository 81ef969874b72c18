//! Well-known protocol headers (SPEC_FULL §6) and internal-header stripping.

use crate::message::HeaderMap;

/// `none | just | wait` — whether and how a producer/consumer expects an ack.
pub const ACKNOWLEDGE: &str = "Acknowledge";
/// `Push | RoundRobin | Pull` — requested queue strategy on auto-create.
pub const QUEUE_TYPE: &str = "Queue-Type";
/// Opaque topic string attached to a queue at creation.
pub const QUEUE_TOPIC: &str = "Queue-Topic";
/// Milliseconds to delay before a put-back re-insertion.
pub const PUT_BACK_DELAY: &str = "Put-Back-Delay";
/// Seconds until an enqueued message times out.
pub const MESSAGE_TIMEOUT: &str = "Message-Timeout";
/// Seconds a delivery may remain unacknowledged before timing out.
pub const ACK_TIMEOUT: &str = "Ack-Timeout";
/// Milliseconds to wait between messages drained from a queue's store.
pub const DELAY_BETWEEN_MESSAGES: &str = "Delay-Between-Messages";
/// Name of the delivery handler factory to instantiate for a queue.
pub const DELIVERY_HANDLER: &str = "Delivery-Handler";
/// Presence indicates a negative acknowledgement; value is a diagnostic reason.
pub const NACK_REASON: &str = "Nack-Reason";
/// Routing policy requested when creating a router.
pub const ROUTE_METHOD: &str = "Route-Method";
/// Binding name, for binding CRUD operations.
pub const BINDING_NAME: &str = "Binding-Name";
/// Glob pattern used by list operations.
pub const FILTER: &str = "Filter";
/// `yes` to include the priority sequence in a clear-messages operation.
pub const CLEAR_PRIORITY: &str = "Clear-Priority";
/// `yes` to include the regular sequence in a clear-messages operation.
pub const CLEAR_MESSAGES: &str = "Clear-Messages";
/// Queue name used on init/auto-create headers.
pub const QUEUE_NAME: &str = "Queue-Name";
/// Requested status transition for an `UpdateQueue` operation.
pub const QUEUE_STATUS: &str = "Queue-Status";

/// Headers that configure broker-internal behavior and must never reach a
/// consumer, producer ack, or durable store (SPEC_FULL §6, "Internal routing
/// headers... are stripped from any message before it reaches consumers or
/// durable storage").
const INTERNAL_HEADERS: &[&str] = &[
    QUEUE_NAME,
    QUEUE_TYPE,
    QUEUE_TOPIC,
    MESSAGE_TIMEOUT,
    ACK_TIMEOUT,
    PUT_BACK_DELAY,
    DELAY_BETWEEN_MESSAGES,
    DELIVERY_HANDLER,
    QUEUE_STATUS,
];

/// Strip every internal/administrative header from `headers` in place.
pub fn strip_internal_headers(headers: &mut HeaderMap) {
    headers.remove_all(INTERNAL_HEADERS);
}
