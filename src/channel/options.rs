//! Broadcast channel configuration (SPEC_FULL §12).

use thiserror::Error;

/// Validation failure for a [`ChannelOptionsBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelOptionsError {
    /// `client_limit` was set to zero.
    #[error("client_limit must be greater than zero when set")]
    ZeroClientLimit,
    /// `message_size_limit` was set to zero.
    #[error("message_size_limit must be greater than zero when set")]
    ZeroMessageSizeLimit,
}

/// Resolved broadcast channel configuration (SPEC_FULL §4.7).
#[derive(Debug, Clone, Default)]
pub struct ChannelOptions {
    /// Maximum concurrent subscribers, if bounded.
    pub client_limit: Option<usize>,
    /// Maximum broadcast payload size in bytes, if bounded.
    pub message_size_limit: Option<usize>,
}

/// Builder for [`ChannelOptions`], following the validate-before-build
/// convention used across this crate's configuration types.
#[derive(Debug, Clone, Default)]
pub struct ChannelOptionsBuilder {
    options: ChannelOptions,
}

impl ChannelOptionsBuilder {
    /// Start from the default (unbounded) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the concurrent subscriber count.
    pub fn client_limit(mut self, limit: usize) -> Self {
        self.options.client_limit = Some(limit);
        self
    }

    /// Bound the per-broadcast payload size.
    pub fn message_size_limit(mut self, limit: usize) -> Self {
        self.options.message_size_limit = Some(limit);
        self
    }

    /// Validate and build the final [`ChannelOptions`].
    pub fn build(self) -> Result<ChannelOptions, ChannelOptionsError> {
        if matches!(self.options.client_limit, Some(0)) {
            return Err(ChannelOptionsError::ZeroClientLimit);
        }
        if matches!(self.options.message_size_limit, Some(0)) {
            return Err(ChannelOptionsError::ZeroMessageSizeLimit);
        }
        Ok(self.options)
    }
}
