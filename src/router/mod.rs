//! Router and bindings (SPEC_FULL §4.5, §4.6).

pub mod binding;
pub mod router;

pub use binding::{Binding, BindingSnapshot, ClientFilter, DirectBinding, Interaction, QueueBinding};
pub use router::{Router, RouterSnapshot};

/// Routing policy shared by [`Router::publish`] and [`DirectBinding`]'s
/// internal multi-client fan-out (SPEC_FULL §3 `Router`, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    /// Send to every target, aggregate success.
    Distribute,
    /// Send to the first target that accepts the message.
    OnlyFirst,
    /// Send to one target, rotating across calls.
    RoundRobin,
}
