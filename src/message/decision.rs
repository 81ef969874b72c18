//! [`Decision`]: a delivery handler's instructions to a queue after each
//! lifecycle callback.

use serde::{Deserialize, Serialize};

/// Where a put-back re-insertion should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PutBack {
    /// Do not put the message back.
    #[default]
    No,
    /// Re-insert at the head of the priority sequence.
    Priority,
    /// Re-insert at the head of the regular sequence.
    Regular,
}

/// Whether a producer ack/nack should be sent, and which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transmission {
    /// No producer ack/nack.
    #[default]
    None,
    /// Send a positive ack.
    Successful,
    /// Send a negative ack.
    Failed,
}

/// The delivery handler's instructions after a lifecycle callback
/// (SPEC_FULL §3 `Decision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decision {
    /// Stop processing the remaining pipeline steps.
    pub interrupt: bool,
    /// Persist the message via the delivery handler's `saveMessage` hook.
    pub save: bool,
    /// Mark the message removed from the queue.
    pub delete: bool,
    /// Where to re-insert the message, if anywhere.
    pub put_back: PutBack,
    /// What producer ack/nack to send, if any.
    pub transmission: Transmission,
}

impl Decision {
    /// The decision that changes nothing: continue the pipeline.
    pub fn pass() -> Self {
        Self::default()
    }

    /// A decision that deletes the message and acknowledges the producer.
    pub fn complete() -> Self {
        Self {
            delete: true,
            transmission: Transmission::Successful,
            ..Self::default()
        }
    }

    /// Combine two decisions: the final decision is the OR of booleans; for
    /// `put_back` and `transmission`, a non-default value in `other`
    /// overrides `self`'s value (SPEC_FULL §3 composition rule).
    pub fn combine(self, other: Decision) -> Decision {
        Decision {
            interrupt: self.interrupt || other.interrupt,
            save: self.save || other.save,
            delete: self.delete || other.delete,
            put_back: if other.put_back != PutBack::No {
                other.put_back
            } else {
                self.put_back
            },
            transmission: if other.transmission != Transmission::None {
                other.transmission
            } else {
                self.transmission
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_ors_booleans() {
        let a = Decision { save: true, ..Decision::default() };
        let b = Decision { delete: true, ..Decision::default() };
        let c = a.combine(b);
        assert!(c.save);
        assert!(c.delete);
    }

    #[test]
    fn combine_lets_non_default_putback_win() {
        let a = Decision { put_back: PutBack::Regular, ..Decision::default() };
        let b = Decision { put_back: PutBack::Priority, ..Decision::default() };
        assert_eq!(a.combine(b).put_back, PutBack::Priority);
    }

    #[test]
    fn combine_keeps_existing_putback_when_other_is_default() {
        let a = Decision { put_back: PutBack::Regular, ..Decision::default() };
        let b = Decision::default();
        assert_eq!(a.combine(b).put_back, PutBack::Regular);
    }
}
