//! Shared registry error type (SPEC_FULL §11).

use thiserror::Error;

use crate::util::NameError;

/// Failure returned by a queue/router/channel registry mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The candidate name failed shape validation.
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// An entity with this name already exists.
    #[error("'{0}' already exists")]
    Duplicate(String),

    /// No entity with this name is registered.
    #[error("'{0}' not found")]
    NotFound(String),
}
