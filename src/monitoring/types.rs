//! Monitoring event types and configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};

/// Configuration for monitoring behavior.
///
/// Controls how events are recorded, filtered, and stored in the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
///
/// Provides queryable access to monitoring counters and recent event history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// Timestamp when snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Total number of events recorded
    pub total_events: u64,

    /// Number of trace-level events
    pub trace_count: u64,

    /// Number of debug-level events
    pub debug_count: u64,

    /// Number of info-level events
    pub info_count: u64,

    /// Number of warning-level events
    pub warning_count: u64,

    /// Number of error-level events
    pub error_count: u64,

    /// Number of critical-level events
    pub critical_count: u64,

    /// Recent events (up to max_history_size)
    pub recent_events: Vec<E>,
}

// ============================================================================
// Queue Events
// ============================================================================

/// Events related to a single queue's message lifecycle (SPEC_FULL §10).
#[derive(Debug, Clone, Serialize)]
pub struct QueueEvent {
    /// Timestamp when event occurred.
    pub timestamp: DateTime<Utc>,

    /// Name of the queue that emitted this event.
    pub target: String,

    /// Id of the message involved, if any.
    pub message_id: Option<String>,

    /// Specific queue event type.
    pub event_kind: QueueEventKind,

    /// Additional event metadata.
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for QueueEvent {
    const EVENT_TYPE: &'static str = "queue";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            QueueEventKind::Push => EventSeverity::Trace,
            QueueEventKind::Dequeued => EventSeverity::Trace,
            QueueEventKind::Ack => EventSeverity::Debug,
            QueueEventKind::Nack { .. } => EventSeverity::Warning,
            QueueEventKind::Timeout => EventSeverity::Warning,
            QueueEventKind::PutBack => EventSeverity::Debug,
            QueueEventKind::StatusChanged { .. } => EventSeverity::Info,
            QueueEventKind::AutoDestroyed => EventSeverity::Info,
        }
    }
}

/// Specific types of queue events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum QueueEventKind {
    /// A message was accepted into the store.
    Push,

    /// A message was delivered to and removed for a consumer via pull.
    Dequeued,

    /// A delivery was positively acknowledged.
    Ack,

    /// A delivery was negatively acknowledged.
    Nack {
        /// The `Nack-Reason` header value, if present.
        reason: Option<String>,
    },

    /// A tracked delivery's deadline elapsed unacknowledged.
    Timeout,

    /// A message was returned to the store under the put-back policy.
    PutBack,

    /// The queue's lifecycle status changed.
    StatusChanged {
        /// Status before the transition, as a display string.
        from: String,
        /// Status after the transition, as a display string.
        to: String,
    },

    /// The queue tore itself down per its auto-destroy policy.
    AutoDestroyed,
}

// ============================================================================
// Router Events
// ============================================================================

/// Events related to a router's publish operations (SPEC_FULL §10).
#[derive(Debug, Clone, Serialize)]
pub struct RouterEvent {
    /// Timestamp when event occurred.
    pub timestamp: DateTime<Utc>,

    /// Name of the router that emitted this event.
    pub target: String,

    /// Specific router event type.
    pub event_kind: RouterEventKind,

    /// Additional event metadata.
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for RouterEvent {
    const EVENT_TYPE: &'static str = "router";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            RouterEventKind::Published { .. } => EventSeverity::Trace,
            RouterEventKind::BindingFailed { .. } => EventSeverity::Warning,
            RouterEventKind::NoReceivers => EventSeverity::Warning,
        }
    }
}

/// Specific types of router events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RouterEventKind {
    /// A message was successfully published to at least one binding.
    Published {
        /// Name of the binding that accepted the message.
        binding: String,
    },

    /// A binding's send failed.
    BindingFailed {
        /// Name of the binding that failed.
        binding: String,
    },

    /// No binding accepted the message.
    NoReceivers,
}

// ============================================================================
// Channel Events
// ============================================================================

/// Events related to a broadcast channel (SPEC_FULL §10).
#[derive(Debug, Clone, Serialize)]
pub struct ChannelEvent {
    /// Timestamp when event occurred.
    pub timestamp: DateTime<Utc>,

    /// Name of the channel that emitted this event.
    pub target: String,

    /// Specific channel event type.
    pub event_kind: ChannelEventKind,

    /// Additional event metadata.
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ChannelEvent {
    const EVENT_TYPE: &'static str = "channel";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ChannelEventKind::Subscribed => EventSeverity::Debug,
            ChannelEventKind::Unsubscribed => EventSeverity::Debug,
            ChannelEventKind::Broadcast { .. } => EventSeverity::Trace,
        }
    }
}

/// Specific types of channel events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChannelEventKind {
    /// A client subscribed.
    Subscribed,

    /// A client unsubscribed or was pruned on disconnect.
    Unsubscribed,

    /// A message was broadcast to the subscriber set.
    Broadcast {
        /// Number of subscribers the broadcast was attempted against.
        subscriber_count: usize,
    },
}

// ============================================================================
// Dispatch Events
// ============================================================================

/// Events related to inbound frame dispatch (SPEC_FULL §10).
#[derive(Debug, Clone, Serialize)]
pub struct DispatchEvent {
    /// Timestamp when event occurred.
    pub timestamp: DateTime<Utc>,

    /// Name of the client whose frame was dispatched.
    pub target: String,

    /// Specific dispatch event type.
    pub event_kind: DispatchEventKind,

    /// Additional event metadata.
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for DispatchEvent {
    const EVENT_TYPE: &'static str = "dispatch";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            DispatchEventKind::Accepted { .. } => EventSeverity::Trace,
            DispatchEventKind::Rejected { .. } => EventSeverity::Info,
            DispatchEventKind::Unauthorized { .. } => EventSeverity::Warning,
        }
    }
}

/// Specific types of dispatch events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DispatchEventKind {
    /// The operation was accepted and applied.
    Accepted {
        /// Content-type tag of the frame handled.
        content_type: u16,
    },

    /// The operation was rejected (not-found, duplicate, limit, etc).
    Rejected {
        /// Content-type tag of the frame handled.
        content_type: u16,
        /// Reason the operation was rejected.
        reason: String,
    },

    /// An authorization hook denied the operation.
    Unauthorized {
        /// Content-type tag of the frame handled.
        content_type: u16,
    },
}
