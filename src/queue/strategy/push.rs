//! Broadcast (`Push`) distribution strategy (SPEC_FULL §4.3).

use async_trait::async_trait;

use super::{QueueStrategy, StrategyContext};
use crate::message::QueueMessage;
use crate::result::OperationResult;
use crate::util::ClientId;

/// Broadcasts every pushed message to every connected subscriber, with no
/// ack tracking. Does not participate in the store-draining trigger loop.
#[derive(Debug, Default)]
pub struct PushStrategy;

#[async_trait]
impl QueueStrategy for PushStrategy {
    fn trigger_supported(&self) -> bool {
        false
    }

    async fn push(&self, ctx: &StrategyContext<'_>, message: QueueMessage) -> OperationResult {
        let order = ctx.order.read().clone();
        let receivers: Vec<_> = order
            .iter()
            .filter_map(|id| ctx.clients.get(id).map(|entry| entry.client.clone()))
            .filter(|client| client.is_connected())
            .collect();

        if receivers.is_empty() {
            return OperationResult::NoConsumers;
        }

        for receiver in receivers {
            let _ = receiver.send(message.message.clone()).await;
        }
        OperationResult::Success
    }

    async fn pull(&self, _ctx: &StrategyContext<'_>, _client: ClientId, _max: usize) -> Vec<QueueMessage> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientRef, ClientType, DisconnectedSink};
    use crate::message::{Message, MessageKind};
    use crate::queue::client::QueueClient;
    use crate::queue::handler::DefaultDeliveryHandler;
    use crate::queue::options::QueueOptions;
    use bytes::Bytes;
    use dashmap::DashMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn no_connected_clients_yields_no_consumers() {
        let strategy = PushStrategy;
        let clients = DashMap::new();
        let order = parking_lot::RwLock::new(Vec::new());
        let store = crate::store::MessageStore::new();
        let tracker = crate::delivery::DeliveryTracker::new();
        let handler: Arc<dyn crate::queue::handler::DeliveryHandler> = Arc::new(DefaultDeliveryHandler);
        let options = QueueOptions::default();
        let sink = crate::queue::strategy::NoopDecisionSink;
        let ctx = StrategyContext {
            store: &store,
            clients: &clients,
            order: &order,
            tracker: &tracker,
            handler: &handler,
            options: &options,
            decision_sink: &sink,
        };
        let qm = QueueMessage::new(Message::new(MessageKind::QueueMessage, "q", Bytes::new()), None);
        let outcome = strategy.push(&ctx, qm).await;
        assert_eq!(outcome, OperationResult::NoConsumers);
    }

    #[tokio::test]
    async fn disconnected_clients_are_skipped() {
        let strategy = PushStrategy;
        let clients = DashMap::new();
        let client = ClientRef::new(
            crate::util::ClientId::new(),
            "c",
            ClientType("consumer".into()),
            Arc::new(DisconnectedSink),
        );
        let id = client.id();
        clients.insert(id, QueueClient::new(client));
        let order = parking_lot::RwLock::new(vec![id]);

        let store = crate::store::MessageStore::new();
        let tracker = crate::delivery::DeliveryTracker::new();
        let handler: Arc<dyn crate::queue::handler::DeliveryHandler> = Arc::new(DefaultDeliveryHandler);
        let options = QueueOptions::default();
        let sink = crate::queue::strategy::NoopDecisionSink;
        let ctx = StrategyContext {
            store: &store,
            clients: &clients,
            order: &order,
            tracker: &tracker,
            handler: &handler,
            options: &options,
            decision_sink: &sink,
        };
        let qm = QueueMessage::new(Message::new(MessageKind::QueueMessage, "q", Bytes::new()), None);
        let outcome = strategy.push(&ctx, qm).await;
        assert_eq!(outcome, OperationResult::NoConsumers);
    }
}
