//! Inbound frame content-type tags (SPEC_FULL §6).
//!
//! [`crate::message::Message`] already carries every field an inbound frame
//! needs (`kind`, `contentType`, `target`, `id`, `highPriority`/
//! `waitResponse` flags, `headers`, `payload`), so it doubles as the frame
//! the dispatcher switches on. These constants are the
//! well-known `contentType` values that select a dispatcher operation
//! (SPEC_FULL §4.8); actual wire framing/transport remains out of scope.

/// Subscribe the sender to a queue, auto-creating it if absent.
pub const QUEUE_SUBSCRIBE: u16 = 1;
/// Unsubscribe the sender from a queue; `target = "*"` unsubscribes from every queue.
pub const QUEUE_UNSUBSCRIBE: u16 = 2;
/// Create a queue with headers-derived options.
pub const CREATE_QUEUE: u16 = 3;
/// Remove a queue.
pub const REMOVE_QUEUE: u16 = 4;
/// Change a queue's lifecycle status.
pub const UPDATE_QUEUE: u16 = 5;
/// Clear a queue's priority and/or regular sequence.
pub const CLEAR_MESSAGES: u16 = 6;
/// Publish through a named router.
pub const PUBLISH: u16 = 7;
/// Create a router.
pub const CREATE_ROUTER: u16 = 8;
/// Remove a router.
pub const REMOVE_ROUTER: u16 = 9;
/// Attach a queue binding to a router.
pub const CREATE_QUEUE_BINDING: u16 = 10;
/// Attach a direct binding to a router.
pub const CREATE_DIRECT_BINDING: u16 = 11;
/// Detach a binding from a router.
pub const REMOVE_BINDING: u16 = 12;
/// Subscribe the sender to a broadcast channel.
pub const CHANNEL_SUBSCRIBE: u16 = 13;
/// Unsubscribe the sender from a broadcast channel.
pub const CHANNEL_UNSUBSCRIBE: u16 = 14;
/// Forward a message directly to another client or client group.
pub const PEER_MESSAGE: u16 = 15;
