//! End-to-end routing scenarios combining `Router`, `Queue`, and direct
//! client delivery (SPEC_FULL §8).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use hearth_broker::client::DisconnectedSink;
use hearth_broker::prelude::*;

struct RecordingSink(std::sync::Mutex<Vec<Bytes>>, AtomicUsize);

impl RecordingSink {
    fn new() -> Self {
        Self(std::sync::Mutex::new(Vec::new()), AtomicUsize::new(0))
    }

    fn count(&self) -> usize {
        self.1.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientSink for RecordingSink {
    async fn send(&self, message: Message) -> bool {
        self.1.fetch_add(1, Ordering::SeqCst);
        self.0.lock().unwrap().push(message.payload.clone());
        true
    }

    fn is_connected(&self) -> bool {
        true
    }
}

fn connected_client(name: &str) -> (ClientRef, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let client = ClientRef::new(ClientId::new(), name, ClientType("consumer".into()), sink.clone());
    (client, sink)
}

fn pull_queue(name: &str) -> Arc<Queue> {
    let options = QueueOptionsBuilder::new().queue_type(QueueType::Pull).build().unwrap();
    Queue::new(name, options, &DeliveryHandlerFactory::new(), NoopMonitor::default())
}

fn hello() -> Message {
    Message::new(MessageKind::Event, "r", Bytes::from_static(b"Hello, World!"))
}

#[tokio::test]
async fn distribute_reaches_every_binding() {
    let clients = Arc::new(ClientRegistry::new());
    let (c1, c1_sink) = connected_client("client-1");
    let (c2, c2_sink) = connected_client("client-2");
    clients.register(c1);
    clients.register(c2);

    let push_a = pull_queue("push-a");
    let push_a_cc = pull_queue("push-a-cc");

    let router = Router::new("r", RouteMethod::Distribute, NoopMonitor::default());
    router.add_binding(Arc::new(QueueBinding::new("q1", 5, Interaction::None, push_a.clone())));
    router.add_binding(Arc::new(QueueBinding::new("q2", 10, Interaction::None, push_a_cc.clone())));
    router.add_binding(Arc::new(DirectBinding::new(
        "d1",
        20,
        Interaction::None,
        "client-1",
        RouteMethod::Distribute,
        clients.clone(),
    )));
    router.add_binding(Arc::new(DirectBinding::new(
        "d2",
        0,
        Interaction::None,
        "client-2",
        RouteMethod::Distribute,
        clients.clone(),
    )));

    for _ in 0..4 {
        let result = router.publish(None, hello()).await;
        assert_eq!(result, RouterPublishResult::OkNoRespond);
    }

    assert_eq!(push_a.message_count(), 4);
    assert_eq!(push_a_cc.message_count(), 4);
    assert_eq!(c1_sink.count(), 4);
    assert_eq!(c2_sink.count(), 4);
}

#[tokio::test]
async fn round_robin_router_rotates_across_bindings() {
    let clients = Arc::new(ClientRegistry::new());
    let (c1, c1_sink) = connected_client("client-1");
    let (c2, c2_sink) = connected_client("client-2");
    clients.register(c1);
    clients.register(c2);

    let push_a = pull_queue("push-a");
    let push_a_cc = pull_queue("push-a-cc");

    let router = Router::new("r", RouteMethod::RoundRobin, NoopMonitor::default());
    router.add_binding(Arc::new(QueueBinding::new("q1", 5, Interaction::None, push_a.clone())));
    router.add_binding(Arc::new(QueueBinding::new("q2", 10, Interaction::None, push_a_cc.clone())));
    router.add_binding(Arc::new(DirectBinding::new(
        "d1",
        20,
        Interaction::None,
        "client-1",
        RouteMethod::Distribute,
        clients.clone(),
    )));
    router.add_binding(Arc::new(DirectBinding::new(
        "d2",
        0,
        Interaction::None,
        "client-2",
        RouteMethod::Distribute,
        clients.clone(),
    )));

    for _ in 0..5 {
        router.publish(None, hello()).await;
    }

    assert_eq!(push_a.message_count(), 1);
    assert_eq!(push_a_cc.message_count(), 1);
    assert_eq!(c1_sink.count(), 2);
    assert_eq!(c2_sink.count(), 1);
}

#[tokio::test]
async fn only_first_falls_through_an_offline_binding() {
    let clients = Arc::new(ClientRegistry::new());
    let offline = ClientRef::new(ClientId::new(), "offline", ClientType("consumer".into()), Arc::new(DisconnectedSink));
    clients.register(offline);

    let push_a_cc = pull_queue("push-a-cc");

    let router = Router::new("r", RouteMethod::OnlyFirst, NoopMonitor::default());
    router.add_binding(Arc::new(DirectBinding::new(
        "d1",
        2,
        Interaction::None,
        "offline",
        RouteMethod::Distribute,
        clients.clone(),
    )));
    router.add_binding(Arc::new(QueueBinding::new("q2", 10, Interaction::None, push_a_cc.clone())));

    for _ in 0..4 {
        let result = router.publish(None, hello()).await;
        assert_eq!(result, RouterPublishResult::OkNoRespond);
    }

    assert_eq!(push_a_cc.message_count(), 4);
}

#[tokio::test]
async fn delay_between_messages_throttles_round_robin_delivery() {
    let options = QueueOptionsBuilder::new()
        .queue_type(QueueType::RoundRobin)
        .delay_between_messages(chrono::Duration::milliseconds(100))
        .build()
        .unwrap();
    let queue = Queue::new("throttled", options, &DeliveryHandlerFactory::new(), NoopMonitor::default());
    let (client, sink) = connected_client("consumer");
    queue.subscribe(client).await;

    for i in 0..30 {
        let mut message = Message::new(MessageKind::QueueMessage, "throttled", Bytes::new());
        message.id = Some(format!("m{i}"));
        queue.push(message, None).await;
    }

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let received = sink.count();
    assert!((5..=6).contains(&received), "expected 5 or 6 deliveries, got {received}");
}

struct PutBackOnceHandler {
    target_id: String,
    put_back_done: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl DeliveryHandler for PutBackOnceHandler {
    async fn received_from_producer(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn begin_send(&self, _message: &QueueMessage, _receiver: &ClientRef) -> Decision {
        Decision::pass()
    }

    async fn can_consumer_receive(&self, _receiver: &ClientRef) -> bool {
        true
    }

    async fn consumer_receive_failed(&self, _message: &QueueMessage, _receiver: &ClientRef) -> Decision {
        Decision::pass()
    }

    async fn end_send(&self, message: &QueueMessage, _receiver: &ClientRef, success: bool) -> Decision {
        if !success {
            return Decision::pass();
        }
        let is_target = message.message.id.as_deref() == Some(self.target_id.as_str());
        if is_target && !self.put_back_done.swap(true, Ordering::SeqCst) {
            Decision {
                put_back: PutBack::Priority,
                ..Decision::default()
            }
        } else {
            Decision::complete()
        }
    }

    async fn acknowledge_received(&self, _message: &QueueMessage, _receiver: &ClientRef, success: bool) -> Decision {
        if success {
            Decision::complete()
        } else {
            Decision::pass()
        }
    }

    async fn message_timed_out(&self, _delivery: &MessageDelivery) -> Decision {
        Decision::complete()
    }

    async fn save_message(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn message_dequeued(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn exception_thrown(&self, _message: &QueueMessage, _error: &str) -> Decision {
        Decision::pass()
    }
}

#[tokio::test]
async fn priority_put_back_redelivers_before_the_next_message() {
    let factory = DeliveryHandlerFactory::new();
    factory.register("put-back-once", |_ctx| {
        Arc::new(PutBackOnceHandler {
            target_id: "m1".to_string(),
            put_back_done: std::sync::atomic::AtomicBool::new(false),
        })
    });
    let options = QueueOptionsBuilder::new()
        .queue_type(QueueType::RoundRobin)
        .delivery_handler_name("put-back-once")
        .build()
        .unwrap();
    let queue = Queue::new("reorder", options, &factory, NoopMonitor::default());

    let sink = Arc::new(RecordingSink::new());
    let client = ClientRef::new(ClientId::new(), "consumer", ClientType("consumer".into()), sink.clone());
    queue.subscribe(client).await;

    let mut m1 = Message::new(MessageKind::QueueMessage, "reorder", Bytes::from_static(b"m1"));
    m1.id = Some("m1".to_string());
    let mut m2 = Message::new(MessageKind::QueueMessage, "reorder", Bytes::from_static(b"m2"));
    m2.id = Some("m2".to_string());

    queue.push(m1, None).await;
    queue.push(m2, None).await;

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(sink.0.lock().unwrap().as_slice(), [Bytes::from_static(b"m1"), Bytes::from_static(b"m1"), Bytes::from_static(b"m2")]);
}

struct CountingTimeoutHandler(Arc<AtomicUsize>);

#[async_trait]
impl DeliveryHandler for CountingTimeoutHandler {
    async fn received_from_producer(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn begin_send(&self, _message: &QueueMessage, _receiver: &ClientRef) -> Decision {
        Decision::pass()
    }

    async fn can_consumer_receive(&self, _receiver: &ClientRef) -> bool {
        true
    }

    async fn consumer_receive_failed(&self, _message: &QueueMessage, _receiver: &ClientRef) -> Decision {
        Decision::pass()
    }

    async fn end_send(&self, _message: &QueueMessage, _receiver: &ClientRef, _success: bool) -> Decision {
        Decision::pass()
    }

    async fn acknowledge_received(&self, _message: &QueueMessage, _receiver: &ClientRef, success: bool) -> Decision {
        if success {
            Decision::complete()
        } else {
            Decision::pass()
        }
    }

    async fn message_timed_out(&self, _delivery: &MessageDelivery) -> Decision {
        self.0.fetch_add(1, Ordering::SeqCst);
        Decision::complete()
    }

    async fn save_message(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn message_dequeued(&self, _message: &QueueMessage) -> Decision {
        Decision::pass()
    }

    async fn exception_thrown(&self, _message: &QueueMessage, _error: &str) -> Decision {
        Decision::pass()
    }
}

#[tokio::test]
async fn delivery_timeout_fires_once_and_clears_the_tracker() {
    let timeouts = Arc::new(AtomicUsize::new(0));
    let factory = DeliveryHandlerFactory::new();
    let counter = timeouts.clone();
    factory.register("counting-timeout", move |_ctx| Arc::new(CountingTimeoutHandler(counter.clone())));

    let options = QueueOptionsBuilder::new()
        .queue_type(QueueType::RoundRobin)
        .ack_timeout(chrono::Duration::milliseconds(200))
        .delivery_handler_name("counting-timeout")
        .build()
        .unwrap();
    let queue = Queue::new("timeouts", options, &factory, NoopMonitor::default());

    let (client, _sink) = connected_client("consumer");
    queue.subscribe(client).await;

    let message = Message::new(MessageKind::QueueMessage, "timeouts", Bytes::new());
    queue.push(message, None).await;

    tokio::time::sleep(std::time::Duration::from_millis(350)).await;

    assert_eq!(timeouts.load(Ordering::SeqCst), 1);
}
