//! Pluggable queue distribution strategies (SPEC_FULL §4.3).

pub mod pull;
pub mod push;
pub mod round_robin;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::handler::DeliveryHandler;
use super::options::QueueOptions;
use crate::delivery::DeliveryTracker;
use crate::message::{Decision, QueueMessage};
use crate::result::OperationResult;
use crate::store::MessageStore;
use crate::util::ClientId;

pub use pull::PullStrategy;
pub use push::PushStrategy;
pub use round_robin::RoundRobinStrategy;

/// Applies a delivery decision on the strategy's behalf. Implemented by the
/// owning [`super::queue::Queue`]; strategies call through this instead of
/// duplicating put-back/ack-transmission logic (SPEC_FULL §4.4 `applyDecision`).
#[async_trait]
pub trait QueueDecisionSink: Send + Sync {
    /// Apply `decision` to `message`. Returns `false` if the decision
    /// interrupts further pipeline processing.
    async fn apply_decision(&self, message: QueueMessage, decision: Decision) -> bool;
}

/// The shared state a strategy needs to reach in order to dispatch a
/// message, borrowed from the owning [`super::queue::Queue`] for the
/// duration of one call. Strategies never store this; they only read
/// through it and mutate the maps it references.
pub struct StrategyContext<'a> {
    /// The queue's message store.
    pub store: &'a MessageStore,
    /// Subscriptions currently registered on the queue, keyed by client id.
    pub clients: &'a DashMap<ClientId, super::client::QueueClient>,
    /// Registration order of `clients`, for round-robin rotation and
    /// registration-ordered broadcast.
    pub order: &'a RwLock<Vec<ClientId>>,
    /// The queue's delivery tracker.
    pub tracker: &'a DeliveryTracker,
    /// The queue's resolved delivery handler.
    pub handler: &'a Arc<dyn DeliveryHandler>,
    /// The queue's resolved options.
    pub options: &'a QueueOptions,
    /// Sink for applying decisions returned by handler hooks.
    pub decision_sink: &'a dyn QueueDecisionSink,
}

#[cfg(test)]
pub(crate) struct NoopDecisionSink;

#[cfg(test)]
#[async_trait]
impl QueueDecisionSink for NoopDecisionSink {
    async fn apply_decision(&self, _message: QueueMessage, decision: Decision) -> bool {
        !decision.interrupt
    }
}

/// Result of a strategy-transition request (SPEC_FULL §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    /// Reject the transition; remain in the current state.
    DenyAndStay,
    /// Accept the transition.
    Allow,
    /// Accept the transition and immediately invoke the trigger loop.
    AllowAndTrigger,
}

/// A queue's pluggable distribution behavior.
#[async_trait]
pub trait QueueStrategy: Send + Sync {
    /// Whether this strategy participates in the queue's store-draining
    /// trigger loop.
    fn trigger_supported(&self) -> bool;

    /// Dispatch a freshly-stored message. Push-style strategies broadcast
    /// immediately here; store-draining strategies (round-robin, pull) leave
    /// the message for the trigger loop and return [`OperationResult::Success`].
    async fn push(&self, ctx: &StrategyContext<'_>, message: QueueMessage) -> OperationResult;

    /// Serve an explicit pull request for up to `max` messages.
    async fn pull(&self, ctx: &StrategyContext<'_>, client: ClientId, max: usize) -> Vec<QueueMessage>;

    /// Called when this strategy is about to become active, after the
    /// previously active strategy's `on_leave` has run.
    async fn on_enter(&self) {}

    /// Called when this strategy is about to stop being active.
    async fn on_leave(&self) {}
}
