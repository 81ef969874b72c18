//! Shared utility types: identifiers, name validation and serde helpers.

pub mod ids;
pub mod names;
pub mod serde_helpers;

pub use ids::{ClientId, DefaultIdGenerator, IdGenerator};
pub use names::{canonical_key, validate_name, NameError};
pub use serde_helpers::duration_serde;
