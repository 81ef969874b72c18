//! Per-queue message storage (SPEC_FULL §4.1).

pub mod message_store;

pub use message_store::MessageStore;
