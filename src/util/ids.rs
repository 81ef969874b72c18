//! Identifiers used throughout the broker core.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU32, Ordering};

// Layer 2: Third-party crate imports
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for a connected client (producer or consumer).
///
/// # Example
/// ```rust
/// use hearth_broker::util::ClientId;
///
/// let a = ClientId::new();
/// let b = ClientId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generate a new random client id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID as a client id.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates message ids.
///
/// Implementations must produce ids that are collision-free within a single
/// broker process and lexically sortable by generation order, so that a
/// lexical sort of ids recovers (approximately) their creation order. The
/// default implementation combines a millisecond timestamp with a
/// process-local monotonic counter and a short random tail to keep ids
/// unique even when the clock does not advance between two calls.
pub trait IdGenerator: Send + Sync {
    /// Produce a new, unique, lexically sortable message id.
    fn next_id(&self) -> String;
}

/// Default [`IdGenerator`]: `<13 hex timestamp><4 hex counter><8 hex random>`.
///
/// The timestamp component is zero-padded so that ids sort lexically in
/// creation order across the lifetime of a u64 millisecond clock value.
#[derive(Debug, Default)]
pub struct DefaultIdGenerator {
    counter: AtomicU32,
}

impl DefaultIdGenerator {
    /// Create a new generator with its counter reset to zero.
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }
}

impl IdGenerator for DefaultIdGenerator {
    fn next_id(&self) -> String {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
        let tail = (Uuid::new_v4().as_u128() & 0xFFFF_FFFF) as u32;
        format!("{millis:013x}{seq:04x}{tail:08x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn client_id_unique() {
        assert_ne!(ClientId::new(), ClientId::new());
    }

    #[test]
    fn client_id_display_roundtrip() {
        let id = ClientId::new();
        assert_eq!(format!("{id}"), id.as_uuid().to_string());
    }

    #[test]
    fn generated_ids_are_unique() {
        let gen = DefaultIdGenerator::new();
        let ids: HashSet<String> = (0..2000).map(|_| gen.next_id()).collect();
        assert_eq!(ids.len(), 2000);
    }

    #[test]
    fn generated_ids_sort_with_counter() {
        let gen = DefaultIdGenerator::new();
        let a = gen.next_id();
        let b = gen.next_id();
        // Same millisecond (usually): counter component keeps ordering intact.
        if a[..13] == b[..13] {
            assert!(a < b);
        }
    }
}
