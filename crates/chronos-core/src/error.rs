//! Error types for Chronos

use std::fmt;

use thiserror::Error;

/// Which registry a key belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Schema,
    Entity,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Schema => write!(f, "schema"),
            KeyKind::Entity => write!(f, "entity"),
        }
    }
}

/// Core Chronos errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChronosError {
    // Registry errors
    #[error("Duplicate {kind} key: '{key}' already exists")]
    DuplicateKey { kind: KeyKind, key: String },

    #[error("Unknown {kind}: '{key}'")]
    NotFound { kind: KeyKind, key: String },

    #[error("Invalid schema '{type_id}': {reason}")]
    InvalidSchema { type_id: String, reason: String },

    // Scheduling errors
    #[error("Dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}

impl ChronosError {
    pub fn duplicate(kind: KeyKind, key: impl Into<String>) -> Self {
        ChronosError::DuplicateKey {
            kind,
            key: key.into(),
        }
    }

    pub fn not_found(kind: KeyKind, key: impl Into<String>) -> Self {
        ChronosError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Is this a cycle detected at schedule time?
    pub fn is_cycle(&self) -> bool {
        matches!(self, ChronosError::Cycle { .. })
    }
}

/// Result type for Chronos operations
pub type ChronosResult<T> = Result<T, ChronosError>;
