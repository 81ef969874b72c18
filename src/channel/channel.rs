//! Broadcast channel (SPEC_FULL §4.7).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::client::ClientRef;
use crate::headers::strip_internal_headers;
use crate::message::Message;
use crate::monitoring::{ChannelEvent, ChannelEventKind, Monitor, NoopMonitor};
use crate::result::OperationResult;
use crate::util::ClientId;

use super::options::ChannelOptions;

/// A channel's lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Accepts pushes and subscriptions.
    Running,
    /// Refuses pushes (SPEC_FULL §4.7).
    Paused,
}

/// Hook run against a prospective subscriber before it is admitted
/// (SPEC_FULL §4.7 "runs all authenticators"). Kept narrow and local to this
/// module so `channel` does not depend on `dispatcher`'s authorization types.
#[async_trait]
pub trait ChannelAuthenticator: Send + Sync {
    /// Whether `client` may subscribe to this channel.
    async fn authenticate(&self, client: &ClientRef) -> bool;
}

/// A fan-out broadcast target: every connected subscriber receives every
/// accepted push (SPEC_FULL §4.7).
pub struct Channel<M: Monitor<ChannelEvent> + 'static = NoopMonitor<ChannelEvent>> {
    name: String,
    status: RwLock<ChannelStatus>,
    options: RwLock<ChannelOptions>,
    subscribers: DashMap<ClientId, ClientRef>,
    authenticators: RwLock<Vec<Arc<dyn ChannelAuthenticator>>>,
    monitor: M,
}

impl<M: Monitor<ChannelEvent> + 'static> Channel<M> {
    /// Create a running channel with no subscribers or authenticators.
    pub fn new(name: impl Into<String>, options: ChannelOptions, monitor: M) -> Self {
        Self {
            name: name.into(),
            status: RwLock::new(ChannelStatus::Running),
            options: RwLock::new(options),
            subscribers: DashMap::new(),
            authenticators: RwLock::new(Vec::new()),
            monitor,
        }
    }

    /// This channel's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ChannelStatus {
        *self.status.read()
    }

    /// Set the lifecycle status.
    pub fn set_status(&self, status: ChannelStatus) {
        *self.status.write() = status;
    }

    /// Register an authenticator that every future subscribe must pass.
    pub fn add_authenticator(&self, authenticator: Arc<dyn ChannelAuthenticator>) {
        self.authenticators.write().push(authenticator);
    }

    /// Number of currently-subscribed clients.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    async fn emit(&self, kind: ChannelEventKind) {
        let _ = self
            .monitor
            .record(ChannelEvent {
                timestamp: Utc::now(),
                target: self.name.clone(),
                event_kind: kind,
                metadata: Default::default(),
            })
            .await;
    }

    /// Run every registered authenticator against `client`, enforce the
    /// subscriber limit, and admit it if both pass (SPEC_FULL §4.7).
    pub async fn subscribe(&self, client: ClientRef) -> OperationResult {
        for authenticator in self.authenticators.read().iter() {
            if !authenticator.authenticate(&client).await {
                return OperationResult::Unauthorized;
            }
        }
        if let Some(limit) = self.options.read().client_limit {
            if self.subscribers.len() >= limit {
                return OperationResult::LimitExceeded;
            }
        }
        self.subscribers.insert(client.id(), client);
        self.emit(ChannelEventKind::Subscribed).await;
        OperationResult::Success
    }

    /// Remove a subscriber, e.g. on explicit unsubscribe or disconnect
    /// (SPEC_FULL §3 synchronous back-reference pruning).
    pub async fn unsubscribe(&self, client: ClientId) {
        if self.subscribers.remove(&client).is_some() {
            self.emit(ChannelEventKind::Unsubscribed).await;
        }
    }

    /// Broadcast `message` to every connected subscriber (SPEC_FULL §4.7).
    /// Refuses while paused or when the payload exceeds the configured
    /// size limit; delivery to individual subscribers is fire-and-forget.
    pub async fn push(&self, mut message: Message) -> OperationResult {
        if self.status() == ChannelStatus::Paused {
            return OperationResult::StatusNotSupported;
        }
        if let Some(limit) = self.options.read().message_size_limit {
            if message.approximate_size() > limit {
                return OperationResult::LimitExceeded;
            }
        }
        strip_internal_headers(&mut message.headers);

        let subscriber_count = self.subscribers.len();
        for entry in self.subscribers.iter() {
            let client = entry.value().clone();
            let message = message.clone();
            if client.is_connected() {
                let _ = client.send(message).await;
            }
        }
        self.emit(ChannelEventKind::Broadcast { subscriber_count }).await;
        OperationResult::Success
    }
}
