//! Message data model: the wire carrier, its queue envelope, and the
//! delivery-handler decision type (SPEC_FULL §3).

pub mod decision;
pub mod headers;
pub mod kind;
pub mod message;
pub mod queue_message;

pub use decision::{Decision, PutBack, Transmission};
pub use headers::HeaderMap;
pub use kind::MessageKind;
pub use message::Message;
pub use queue_message::QueueMessage;
