//! Round-robin distribution strategy (SPEC_FULL §4.3).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Utc;

use super::{QueueStrategy, StrategyContext};
use crate::delivery::MessageDelivery;
use crate::queue::options::AcknowledgeMode;
use crate::message::QueueMessage;
use crate::result::OperationResult;
use crate::util::ClientId;

const SWEEP_RETRY_DELAY: StdDuration = StdDuration::from_millis(3);

/// Rotates pushed messages across connected, currently-idle consumers.
///
/// Consumed one message at a time by the queue's trigger loop; each call to
/// [`RoundRobinStrategy::push`] blocks (retrying every 3ms) until an
/// eligible consumer appears or the sweep timeout elapses (30 seconds by
/// default, per SPEC_FULL §4.3).
pub struct RoundRobinStrategy {
    last_index: AtomicI64,
    sweep_timeout: chrono::Duration,
}

impl Default for RoundRobinStrategy {
    fn default() -> Self {
        Self {
            last_index: AtomicI64::new(-1),
            sweep_timeout: chrono::Duration::milliseconds(30_000),
        }
    }
}

impl RoundRobinStrategy {
    /// Create a fresh round-robin cursor, starting before the first client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cursor with a non-default sweep timeout, for tests and
    /// deployments that need a tighter no-consumers bound.
    pub fn with_sweep_timeout(sweep_timeout: chrono::Duration) -> Self {
        Self {
            last_index: AtomicI64::new(-1),
            sweep_timeout,
        }
    }

    async fn pick_eligible(&self, ctx: &StrategyContext<'_>) -> Option<ClientId> {
        let order = ctx.order.read().clone();
        let n = order.len();
        if n == 0 {
            return None;
        }
        let start = ((self.last_index.load(Ordering::SeqCst) + 1).rem_euclid(n as i64)) as usize;
        let now = Utc::now();
        for offset in 0..n {
            let idx = (start + offset) % n;
            let id = order[idx];
            let eligible = ctx
                .clients
                .get(&id)
                .map(|entry| entry.is_eligible(now))
                .unwrap_or(false);
            if !eligible {
                continue;
            }
            let client = ctx.clients.get(&id).map(|entry| entry.client.clone());
            if let Some(client) = client {
                if !ctx.handler.can_consumer_receive(&client).await {
                    continue;
                }
            }
            self.last_index.store(idx as i64, Ordering::SeqCst);
            return Some(id);
        }
        None
    }
}

#[async_trait]
impl QueueStrategy for RoundRobinStrategy {
    fn trigger_supported(&self) -> bool {
        true
    }

    async fn push(&self, ctx: &StrategyContext<'_>, mut message: QueueMessage) -> OperationResult {
        let sweep_deadline = Utc::now() + self.sweep_timeout;
        loop {
            if let Some(id) = self.pick_eligible(ctx).await {
                let receiver = match ctx.clients.get(&id) {
                    Some(entry) => entry.client.clone(),
                    None => continue,
                };

                let process_deadline = ctx.options.ack_timeout.map(|d| Utc::now() + d);
                let serialised = ctx.options.acknowledge == AcknowledgeMode::Wait;
                if serialised {
                    if let Some(mut entry) = ctx.clients.get_mut(&id) {
                        entry.begin_processing(message.clone(), process_deadline);
                    }
                }

                let begin_decision = ctx.handler.begin_send(&message, &receiver).await;
                if !ctx.decision_sink.apply_decision(message.clone(), begin_decision).await {
                    return OperationResult::Success;
                }

                let delivered = receiver.send(message.message.clone()).await;
                let end_decision = ctx.handler.end_send(&message, &receiver, delivered).await;
                ctx.decision_sink.apply_decision(message.clone(), end_decision).await;

                if delivered {
                    message.record_delivery(receiver.clone());
                    if ctx.options.ack_timeout.is_some() {
                        ctx.tracker.track(MessageDelivery::new(message, receiver, process_deadline));
                    }
                } else if serialised {
                    if let Some(mut entry) = ctx.clients.get_mut(&id) {
                        entry.clear_processing();
                    }
                }
                return OperationResult::Success;
            }

            if Utc::now() >= sweep_deadline {
                message.message.high_priority = false;
                ctx.store.put(message);
                return OperationResult::NoConsumers;
            }
            tokio::time::sleep(SWEEP_RETRY_DELAY).await;
        }
    }

    async fn pull(&self, _ctx: &StrategyContext<'_>, _client: ClientId, _max: usize) -> Vec<QueueMessage> {
        Vec::new()
    }
}
