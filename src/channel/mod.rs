//! Broadcast channel (SPEC_FULL §4.7).

pub mod channel;
pub mod options;

pub use channel::{Channel, ChannelAuthenticator, ChannelStatus};
pub use options::{ChannelOptions, ChannelOptionsBuilder, ChannelOptionsError};
