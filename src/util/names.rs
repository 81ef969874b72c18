//! Entity name validation shared by queues, routers, channels and bindings.

use thiserror::Error;

/// Characters forbidden anywhere in a queue, router, channel or binding name.
const FORBIDDEN_CHARS: [char; 3] = [' ', '*', ';'];

/// Reason a candidate name was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name was empty.
    #[error("name must not be empty")]
    Empty,

    /// The name contained a forbidden character.
    #[error("name '{name}' contains forbidden character '{ch}'")]
    ForbiddenChar {
        /// The offending name.
        name: String,
        /// The forbidden character found.
        ch: char,
    },
}

/// Validate a candidate entity name against the broker's naming rules.
///
/// Names are compared case-insensitively by callers (registries fold to
/// lowercase before lookup); this function only checks shape.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(NameError::ForbiddenChar {
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Canonical lookup key for a name: case folded for case-insensitive registries.
pub fn canonical_key(name: &str) -> String {
    name.to_lowercase()
}
