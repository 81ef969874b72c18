//! # Monitoring
//!
//! Operational visibility into a running broker: what a queue pushed,
//! acked, or timed out; which binding a router fanned a message into, or
//! failed to; who subscribed to or fell off a channel; which inbound
//! frames the dispatcher accepted, rejected, or refused on authorization.
//! None of this feeds back into broker behavior — it exists so an operator
//! (or an admin-facing status frame) can ask "what has this queue been
//! doing" after the fact.
//!
//! A deployment that doesn't need the bookkeeping wires up [`NoopMonitor`]
//! instead of [`InMemoryMonitor`] per queue/router/channel/dispatcher and
//! pays nothing for it.
//!
//! ## Event Types
//! - `QueueEvent`: Queue message lifecycle (push, dequeue, ack, nack, timeout, put-back)
//! - `RouterEvent`: Router publish outcomes (published, binding failed, no receivers)
//! - `ChannelEvent`: Channel subscription and broadcast activity
//! - `DispatchEvent`: Inbound frame dispatch outcomes
//!
//! ## Examples
//! ```
//! use hearth_broker::monitoring::{InMemoryMonitor, Monitor, MonitoringConfig, QueueEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitoringConfig::default();
//! let monitor = InMemoryMonitor::<QueueEvent>::new(config);
//!
//! // Record events
//! // monitor.record(event).await?;
//!
//! // Take snapshots
//! let snapshot = monitor.snapshot().await?;
//! assert_eq!(snapshot.total_events, 0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod traits;
pub mod types;

pub use error::MonitoringError;
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    ChannelEvent, ChannelEventKind, DispatchEvent, DispatchEventKind, MonitoringConfig,
    MonitoringSnapshot, QueueEvent, QueueEventKind, RouterEvent, RouterEventKind,
};
