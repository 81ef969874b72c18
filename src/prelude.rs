//! Prelude module for convenient imports.
//!
//! Re-exports the broker's commonly-used types so a consumer can get started
//! with one `use`:
//!
//! ```rust
//! use hearth_broker::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Message model
//! - [`Message`], [`MessageKind`], [`HeaderMap`] - the wire carrier and headers
//! - [`QueueMessage`] - a message's in-queue envelope
//! - [`Decision`], [`PutBack`], [`Transmission`] - delivery-handler outcomes
//!
//! ## Clients
//! - [`Client`], [`ClientRef`], [`ClientSink`], [`ClientType`] - connection handles
//! - [`ClientId`] - unique client identifier
//!
//! ## Queues
//! - [`Queue`], [`QueueOptions`], [`QueueOptionsBuilder`], [`QueueStatus`], [`QueueType`]
//! - [`AcknowledgeMode`], [`AutoDestroy`] - per-queue acknowledgement and self-destruction policy
//! - [`QueueSink`] - object-safe queue handle used by bindings and registries
//! - [`DeliveryHandler`], [`DeliveryHandlerFactory`] - pluggable per-message decisions
//! - [`DeliveryTracker`], [`MessageDelivery`], [`AcknowledgeState`] - ack-timeout tracking
//!
//! ## Routing
//! - [`Router`], [`RouteMethod`] - publish policy over a priority-ordered binding set
//! - [`Binding`], [`QueueBinding`], [`DirectBinding`], [`Interaction`]
//!
//! ## Broadcast
//! - [`Channel`], [`ChannelOptions`], [`ChannelOptionsBuilder`], [`ChannelStatus`], [`ChannelAuthenticator`]
//!
//! ## Registries and persistence
//! - [`QueueRegistry`], [`RouterRegistry`], [`ChannelRegistry`], [`ClientRegistry`]
//! - [`PersistenceStore`], [`JsonFilePersistence`]
//!
//! ## Dispatch and authorization
//! - [`Dispatcher`] - inbound frame routing
//! - [`AdminAuthorization`], [`ClientAuthorization`], [`NoopAuthorization`]
//!
//! ## Monitoring
//! - [`Monitor`], [`MonitoringEvent`], [`EventSeverity`]
//! - [`InMemoryMonitor`], [`NoopMonitor`]
//! - [`QueueEvent`], [`RouterEvent`], [`ChannelEvent`], [`DispatchEvent`]
//!
//! ## Cluster
//! - [`ClusterCoordinator`], [`NodeMode`], [`NodeState`]
//!
//! ## Results
//! - [`OperationResult`], [`RouterPublishResult`]

pub use crate::channel::{Channel, ChannelAuthenticator, ChannelOptions, ChannelOptionsBuilder, ChannelStatus};
pub use crate::client::{Client, ClientRef, ClientSink, ClientType};
pub use crate::cluster::{ClusterCoordinator, NodeMode, NodeState};
pub use crate::config::{BrokerConfig, BrokerConfigBuilder, BrokerConfigError};
pub use crate::delivery::{AcknowledgeState, DeliveryTracker, MessageDelivery};
pub use crate::dispatcher::{AdminAuthorization, ClientAuthorization, Dispatcher, NoopAuthorization};
pub use crate::message::{Decision, HeaderMap, Message, MessageKind, PutBack, QueueMessage, Transmission};
pub use crate::monitoring::{
    ChannelEvent, DispatchEvent, EventSeverity, InMemoryMonitor, Monitor, MonitoringEvent,
    NoopMonitor, QueueEvent, RouterEvent,
};
pub use crate::queue::{
    AcknowledgeMode, AutoDestroy, DeliveryHandler, DeliveryHandlerFactory, Queue, QueueOptions,
    QueueOptionsBuilder, QueueSink, QueueStatus, QueueType,
};
pub use crate::registry::{ChannelRegistry, ClientRegistry, JsonFilePersistence, PersistenceStore, QueueRegistry, RouterRegistry};
pub use crate::result::{OperationResult, RouterPublishResult};
pub use crate::router::{
    Binding, BindingSnapshot, ClientFilter, DirectBinding, Interaction, QueueBinding, RouteMethod,
    Router, RouterSnapshot,
};
pub use crate::util::ClientId;
