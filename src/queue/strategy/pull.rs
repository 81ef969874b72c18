//! On-demand (`Pull`) distribution strategy (SPEC_FULL §4.3).

use async_trait::async_trait;

use super::{QueueStrategy, StrategyContext};
use crate::message::QueueMessage;
use crate::result::OperationResult;
use crate::util::ClientId;

/// Holds messages in the store until a consumer explicitly pulls them.
pub struct PullStrategy;

#[async_trait]
impl QueueStrategy for PullStrategy {
    fn trigger_supported(&self) -> bool {
        // Pull consumers drain the store themselves; there is nothing for
        // the queue's background trigger loop to drive.
        false
    }

    async fn push(&self, _ctx: &StrategyContext<'_>, _message: QueueMessage) -> OperationResult {
        // The message is already in the store by the time a strategy's
        // `push` runs (SPEC_FULL §4.4 step 11); pull consumers fetch it
        // later via `pull`, so there is nothing further to do here.
        OperationResult::Success
    }

    async fn pull(&self, ctx: &StrategyContext<'_>, client: ClientId, max: usize) -> Vec<QueueMessage> {
        if !ctx.clients.contains_key(&client) {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(max);
        for _ in 0..max {
            match ctx.store.get_next(true, false) {
                Some(m) => out.push(m),
                None => break,
            }
        }
        out
    }
}
