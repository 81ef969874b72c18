//! Queue lifecycle status (SPEC_FULL §3).

/// A queue's lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Created but not yet initialized by a first push or explicit init.
    NotInitialized,
    /// Accepting pushes and driving delivery.
    Running,
    /// Accepting neither pushes nor new deliveries, but resumable.
    Paused,
    /// Accepting pulls/consumption but rejecting new pushes.
    OnlyConsume,
    /// Producers are blocked while a cluster sync is in flight.
    Syncing,
    /// Terminal: the queue has been torn down.
    Destroyed,
}

impl QueueStatus {
    /// Whether transitioning from `self` to `next` is a legal status
    /// transition (SPEC_FULL §3).
    pub fn can_transition_to(self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        if next == Destroyed {
            return self != Destroyed;
        }
        matches!(
            (self, next),
            (NotInitialized, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, OnlyConsume)
                | (OnlyConsume, Running)
                | (Running, Syncing)
                | (Syncing, Running)
        )
    }

    /// Whether pushes are currently accepted.
    pub fn accepts_push(self) -> bool {
        matches!(self, QueueStatus::NotInitialized | QueueStatus::Running | QueueStatus::Syncing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroyed_is_terminal() {
        assert!(QueueStatus::Running.can_transition_to(QueueStatus::Destroyed));
        assert!(!QueueStatus::Destroyed.can_transition_to(QueueStatus::Running));
    }

    #[test]
    fn paused_and_only_consume_reject_pushes() {
        assert!(!QueueStatus::Paused.accepts_push());
        assert!(!QueueStatus::OnlyConsume.accepts_push());
        assert!(QueueStatus::Running.accepts_push());
    }

    #[test]
    fn cannot_jump_paused_to_only_consume() {
        assert!(!QueueStatus::Paused.can_transition_to(QueueStatus::OnlyConsume));
    }
}
