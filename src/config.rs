//! Top-level broker assembly configuration (SPEC_FULL §12).

use thiserror::Error;

use crate::channel::ChannelOptions;
use crate::cluster::NodeMode;
use crate::queue::QueueOptions;

/// Validation failure for a [`BrokerConfigBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerConfigError {
    /// The routers-file path was empty.
    #[error("routers_path must not be empty")]
    EmptyRoutersPath,
    /// The queues-file path was empty.
    #[error("queues_path must not be empty")]
    EmptyQueuesPath,
}

/// Top-level configuration assembling a broker instance: where persisted
/// router/queue configuration lives (§6), the defaults newly auto-created
/// queues and channels take, and the node's cluster mode.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Path to the JSON file holding persisted router definitions.
    pub routers_path: String,
    /// Path to the JSON file holding persisted queue definitions.
    pub queues_path: String,
    /// Options applied to a queue auto-created without explicit headers.
    pub default_queue_options: QueueOptions,
    /// Options applied to a channel auto-created without explicit headers.
    pub default_channel_options: ChannelOptions,
    /// This node's cluster participation mode.
    pub node_mode: NodeMode,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            routers_path: "routers.json".to_string(),
            queues_path: "queues.json".to_string(),
            default_queue_options: QueueOptions::default(),
            default_channel_options: ChannelOptions::default(),
            node_mode: NodeMode::Standalone,
        }
    }
}

/// Builder for [`BrokerConfig`], following the validate-before-build
/// convention used across this crate's configuration types.
#[derive(Debug, Clone, Default)]
pub struct BrokerConfigBuilder {
    config: BrokerConfig,
}

impl BrokerConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persisted routers-file path.
    pub fn routers_path(mut self, path: impl Into<String>) -> Self {
        self.config.routers_path = path.into();
        self
    }

    /// Set the persisted queues-file path.
    pub fn queues_path(mut self, path: impl Into<String>) -> Self {
        self.config.queues_path = path.into();
        self
    }

    /// Set the default options for auto-created queues.
    pub fn default_queue_options(mut self, options: QueueOptions) -> Self {
        self.config.default_queue_options = options;
        self
    }

    /// Set the default options for auto-created channels.
    pub fn default_channel_options(mut self, options: ChannelOptions) -> Self {
        self.config.default_channel_options = options;
        self
    }

    /// Set this node's cluster participation mode.
    pub fn node_mode(mut self, mode: NodeMode) -> Self {
        self.config.node_mode = mode;
        self
    }

    /// Validate and build the final [`BrokerConfig`].
    pub fn build(self) -> Result<BrokerConfig, BrokerConfigError> {
        if self.config.routers_path.is_empty() {
            return Err(BrokerConfigError::EmptyRoutersPath);
        }
        if self.config.queues_path.is_empty() {
            return Err(BrokerConfigError::EmptyQueuesPath);
        }
        Ok(self.config)
    }
}
