//! `Duration` (de)serialization for [`crate::monitoring::MonitoringConfig`].
//!
//! `std::time::Duration` has no built-in `serde` support; a monitor's
//! `snapshot_interval` is configured in whole seconds, so this module
//! encodes it as a plain `u64` rather than pulling in a generic
//! humantime-style crate for one field.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `#[serde(with = "duration_serde")]` for a whole-seconds `Duration` field.
pub mod duration_serde {
    use super::*;

    /// Serializes Duration as seconds (u64).
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    /// Deserializes Duration from seconds (u64).
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
