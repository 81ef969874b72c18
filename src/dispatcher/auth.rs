//! Authorization hooks consulted before admin- and entity-scoped operations
//! (SPEC_FULL §14, spec §6 "External collaborator interfaces").

use async_trait::async_trait;

use crate::client::ClientRef;
use crate::message::Message;

/// Gate on broker-wide administrative operations (create/remove queue,
/// router, binding). All registered hooks must return `true`; any `false`
/// denies the operation (SPEC_FULL §4.8).
#[async_trait]
pub trait AdminAuthorization: Send + Sync {
    /// Whether `sender` may perform the administrative operation carried by `message`.
    async fn authorize(&self, sender: &ClientRef, message: &Message) -> bool;
}

/// Gate on per-entity operations (subscribe, publish, peer message). All
/// registered hooks must return `true`; any `false` denies the operation.
#[async_trait]
pub trait ClientAuthorization: Send + Sync {
    /// Whether `sender` may perform the entity-scoped operation carried by `message`.
    async fn authorize(&self, sender: &ClientRef, message: &Message) -> bool;
}

/// An [`AdminAuthorization`]/[`ClientAuthorization`] that always permits,
/// the default for a broker that delegates no authorization at all
/// (SPEC_FULL §14).
#[derive(Debug, Default)]
pub struct NoopAuthorization;

#[async_trait]
impl AdminAuthorization for NoopAuthorization {
    async fn authorize(&self, _sender: &ClientRef, _message: &Message) -> bool {
        true
    }
}

#[async_trait]
impl ClientAuthorization for NoopAuthorization {
    async fn authorize(&self, _sender: &ClientRef, _message: &Message) -> bool {
        true
    }
}
