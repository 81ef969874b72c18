//! Per-queue configuration (SPEC_FULL §12).

use chrono::Duration;
use thiserror::Error;

/// Distribution strategy a queue runs under (SPEC_FULL §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueType {
    /// Broadcast every pushed message to every connected subscriber.
    Push,
    /// Rotate pushed messages across eligible connected consumers.
    RoundRobin,
    /// Hold messages in the store until a consumer pulls them.
    Pull,
}

/// What level of acknowledgement a queue's consumers are expected to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcknowledgeMode {
    /// No acknowledgement is tracked.
    None,
    /// A bare ack/nack is tracked but sends are not serialized.
    Just,
    /// Acks are tracked and the next send waits for the previous ack.
    Wait,
}

/// When a queue with no remaining activity should self-destruct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDestroy {
    /// Never auto-destroy.
    Disabled,
    /// Destroy once the subscriber set is empty.
    NoConsumers,
    /// Destroy once the store is empty and no delivery is pending.
    NoMessages,
    /// Destroy once both conditions above hold.
    Empty,
}

/// Validation failure for a [`QueueOptionsBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueOptionsError {
    /// `message_size_limit` was set to zero.
    #[error("message_size_limit must be greater than zero when set")]
    ZeroMessageSizeLimit,
    /// `message_limit` was set to zero.
    #[error("message_limit must be greater than zero when set")]
    ZeroMessageLimit,
    /// `delivery_handler_name` was empty.
    #[error("delivery_handler_name must not be empty")]
    EmptyDeliveryHandlerName,
}

/// Resolved queue configuration (SPEC_FULL §12).
#[derive(Debug, Clone)]
pub struct QueueOptions {
    /// Distribution strategy.
    pub queue_type: QueueType,
    /// Acknowledgement level expected of consumers.
    pub acknowledge: AcknowledgeMode,
    /// Maximum resident message count, if bounded.
    pub message_limit: Option<usize>,
    /// Maximum message size in bytes, if bounded.
    pub message_size_limit: Option<usize>,
    /// Time-to-live applied to newly pushed messages, if set.
    pub message_timeout: Option<Duration>,
    /// Deadline granted to a consumer to ack a delivery, if set.
    pub ack_timeout: Option<Duration>,
    /// Delay before a put-back re-insertion becomes visible.
    pub put_back_delay: Duration,
    /// Delay the trigger loop sleeps between drained messages.
    pub delay_between_messages: Duration,
    /// Self-destruction policy.
    pub auto_destroy: AutoDestroy,
    /// Name of the delivery handler factory to instantiate for this queue.
    pub delivery_handler_name: String,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            queue_type: QueueType::Push,
            acknowledge: AcknowledgeMode::None,
            message_limit: None,
            message_size_limit: None,
            message_timeout: None,
            ack_timeout: None,
            put_back_delay: Duration::zero(),
            delay_between_messages: Duration::zero(),
            auto_destroy: AutoDestroy::Disabled,
            delivery_handler_name: "Default".to_string(),
        }
    }
}

/// Builder for [`QueueOptions`], following the validate-before-build
/// convention used across this crate's configuration types.
#[derive(Debug, Clone, Default)]
pub struct QueueOptionsBuilder {
    options: QueueOptions,
}

impl QueueOptionsBuilder {
    /// Start from the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distribution strategy.
    pub fn queue_type(mut self, queue_type: QueueType) -> Self {
        self.options.queue_type = queue_type;
        self
    }

    /// Set the acknowledgement mode.
    pub fn acknowledge(mut self, mode: AcknowledgeMode) -> Self {
        self.options.acknowledge = mode;
        self
    }

    /// Bound the resident message count.
    pub fn message_limit(mut self, limit: usize) -> Self {
        self.options.message_limit = Some(limit);
        self
    }

    /// Bound the per-message size.
    pub fn message_size_limit(mut self, limit: usize) -> Self {
        self.options.message_size_limit = Some(limit);
        self
    }

    /// Set a message time-to-live.
    pub fn message_timeout(mut self, timeout: Duration) -> Self {
        self.options.message_timeout = Some(timeout);
        self
    }

    /// Set the per-delivery ack deadline.
    pub fn ack_timeout(mut self, timeout: Duration) -> Self {
        self.options.ack_timeout = Some(timeout);
        self
    }

    /// Set the put-back re-insertion delay.
    pub fn put_back_delay(mut self, delay: Duration) -> Self {
        self.options.put_back_delay = delay;
        self
    }

    /// Set the trigger-loop inter-message delay.
    pub fn delay_between_messages(mut self, delay: Duration) -> Self {
        self.options.delay_between_messages = delay;
        self
    }

    /// Set the auto-destroy policy.
    pub fn auto_destroy(mut self, policy: AutoDestroy) -> Self {
        self.options.auto_destroy = policy;
        self
    }

    /// Name the delivery handler factory to instantiate.
    pub fn delivery_handler_name(mut self, name: impl Into<String>) -> Self {
        self.options.delivery_handler_name = name.into();
        self
    }

    /// Validate and build the final [`QueueOptions`].
    pub fn build(self) -> Result<QueueOptions, QueueOptionsError> {
        if matches!(self.options.message_size_limit, Some(0)) {
            return Err(QueueOptionsError::ZeroMessageSizeLimit);
        }
        if matches!(self.options.message_limit, Some(0)) {
            return Err(QueueOptionsError::ZeroMessageLimit);
        }
        if self.options.delivery_handler_name.is_empty() {
            return Err(QueueOptionsError::EmptyDeliveryHandlerName);
        }
        Ok(self.options)
    }
}
