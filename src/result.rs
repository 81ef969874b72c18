//! Shared operation-result taxonomy (SPEC_FULL §11 / spec §7).

use serde::{Deserialize, Serialize};

/// The closed set of outcomes returned from push/publish/subscribe
/// operations across the broker core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationResult {
    /// The operation completed and at least one receiver accepted the message,
    /// or the entity was mutated as requested.
    Success,
    /// The queue's current status does not permit this operation.
    StatusNotSupported,
    /// A configured quota (message count or size) was exceeded.
    LimitExceeded,
    /// A round-robin or pull delivery found no eligible consumer.
    NoConsumers,
    /// A router publish found no binding willing to accept the message.
    NoReceivers,
    /// A router has no bindings configured at all.
    NoBindings,
    /// The target router is disabled.
    Disabled,
    /// An authorization hook denied the operation.
    Unauthorized,
    /// The named target does not exist.
    NotFound,
    /// An entity with this name already exists.
    Duplicate,
    /// An otherwise-unclassified failure occurred.
    Error,
}

impl OperationResult {
    /// True for [`OperationResult::Success`] only.
    pub fn is_success(self) -> bool {
        matches!(self, OperationResult::Success)
    }
}

/// Outcome of a [`crate::queue::Queue::push`] call.
pub type PushResult = OperationResult;

/// Outcome of a [`crate::router::Router::publish`] call, additionally
/// distinguishing whether a response is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterPublishResult {
    /// Delivered and at least one binding expects a response.
    OkAndWillRespond,
    /// Delivered, no binding expects a response.
    OkNoRespond,
    /// No binding accepted the message.
    NoReceivers,
    /// The router has no bindings.
    NoBindings,
    /// The router is disabled.
    Disabled,
}

/// Outcome of a subscribe/unsubscribe operation.
pub type SubscriptionResult = OperationResult;
