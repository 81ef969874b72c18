//! # hearth-broker — in-memory message routing and delivery engine
//!
//! A standalone broker core providing queues, routers, and broadcast
//! channels over an in-memory client registry, with pluggable delivery
//! handlers, cluster replication hooks, and authorization.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hearth_broker::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = QueueRegistry::new();
//!     let queue = registry.get_or_create("orders", QueueOptions::default()).await;
//!     // push, subscribe, and pull through `queue`
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Core entities
//! - [`message`] - `Message`, `QueueMessage`, headers, and delivery decisions
//! - [`queue`] - `Queue`, distribution strategies, and delivery handlers
//! - [`router`] - `Router` and its bindings
//! - [`channel`] - Broadcast `Channel`
//! - [`client`] - `Client`/`ClientRef` connection handles
//!
//! ## Infrastructure
//! - [`registry`] - Name-keyed entity registries and JSON persistence
//! - [`dispatcher`] - Inbound frame routing and authorization
//! - [`config`] - Top-level broker assembly configuration
//! - [`delivery`] - Acknowledge-timeout tracking
//! - [`store`] - The dual priority/regular message store
//! - [`cluster`] - Replication hook consumed by the queue pipeline
//! - [`monitoring`] - Event tracking for observability
//! - [`result`] - Shared operation-outcome enums
//! - [`util`] - Identifiers and name validation

pub mod channel;
pub mod client;
pub mod cluster;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod headers;
pub mod message;
pub mod monitoring;
pub mod queue;
pub mod registry;
pub mod result;
pub mod router;
pub mod store;
pub mod util;

pub mod prelude;

pub use client::{Client, ClientRef, ClientSink, ClientType};
pub use cluster::{ClusterCoordinator, NodeMode, NodeState};
pub use delivery::{AcknowledgeState, DeliveryTracker, MessageDelivery};
pub use message::{Decision, HeaderMap, Message, MessageKind, QueueMessage};
pub use queue::{Queue, QueueOptions, QueueStatus, QueueType};
pub use result::{OperationResult, RouterPublishResult};
pub use util::{ClientId, DefaultIdGenerator, IdGenerator};
