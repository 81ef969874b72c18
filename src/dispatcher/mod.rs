//! Inbound frame dispatch (SPEC_FULL §4.8).

pub mod auth;
pub mod dispatcher;
pub mod frame;

pub use auth::{AdminAuthorization, ClientAuthorization, NoopAuthorization};
pub use dispatcher::Dispatcher;
