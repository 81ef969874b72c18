//! Delivery tracking: in-flight ack bookkeeping and deadline scheduling
//! (SPEC_FULL §4.2).

pub mod tracker;

pub use tracker::{AcknowledgeState, DeliveryTimeoutSink, DeliveryTracker, MessageDelivery};
