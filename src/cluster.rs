//! Cluster replication hook consumed by the queue state machine (SPEC_FULL §6).
//!
//! Replication between broker nodes is out of scope for this crate (spec
//! §1); this module specifies only the interface the queue pipeline calls
//! into, plus a standalone default that makes the crate runnable without an
//! external cluster implementation (SPEC_FULL §14).

use async_trait::async_trait;

use crate::message::{Decision, Message, QueueMessage};

/// A cluster node's role with respect to a given queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// This node accepts producer writes and drives replication.
    Main,
    /// This node is next in line to become `Main` if it fails over.
    Successor,
    /// This node mirrors `Main` but does not accept producer writes.
    Replica,
}

/// Whether a node participates in cluster replication at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMode {
    /// No cluster; this node is authoritative for everything it owns.
    Standalone,
    /// Part of a cluster with replication to other nodes.
    Reliable,
}

/// Hook the queue pipeline calls at well-defined replication points
/// (SPEC_FULL §6). A `Main` node calls `send_*` before or after applying a
/// local mutation, per the call sites in [`crate::queue::Queue`].
#[async_trait]
pub trait ClusterCoordinator: Send + Sync {
    /// This node's current replication role.
    fn state(&self) -> NodeState;

    /// This node's cluster participation mode.
    fn mode(&self) -> NodeMode;

    /// Replicate a freshly-produced message before it is stored locally.
    /// Returns `false` to abort the local push (SPEC_FULL §4.4 step 8).
    async fn send_queue_message(&self, queue: &str, message: &Message) -> bool;

    /// Replicate a put-back re-insertion.
    async fn send_put_back(&self, queue: &str, message: &QueueMessage, decision: &Decision);

    /// Replicate a permanent message removal.
    async fn send_message_removal(&self, queue: &str, message_id: &str);

    /// Replicate a queue options/status update.
    async fn send_queue_updated(&self, queue: &str);

    /// Replicate a queue removal.
    async fn send_queue_removed(&self, queue: &str);
}

/// A [`ClusterCoordinator`] for a single-node, standalone deployment: every
/// hook is a no-op and `send_queue_message` always permits the local push.
#[derive(Debug, Default)]
pub struct NoopClusterCoordinator;

#[async_trait]
impl ClusterCoordinator for NoopClusterCoordinator {
    fn state(&self) -> NodeState {
        NodeState::Main
    }

    fn mode(&self) -> NodeMode {
        NodeMode::Standalone
    }

    async fn send_queue_message(&self, _queue: &str, _message: &Message) -> bool {
        true
    }

    async fn send_put_back(&self, _queue: &str, _message: &QueueMessage, _decision: &Decision) {}

    async fn send_message_removal(&self, _queue: &str, _message_id: &str) {}

    async fn send_queue_updated(&self, _queue: &str) {}

    async fn send_queue_removed(&self, _queue: &str) {}
}
