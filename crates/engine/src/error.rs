//! The module contains the errors the engine can throw.
//!
//! Every failure degrades to a smaller, well-defined partial result at the
//! call site (unmodified trip, empty suggestion list, empty collection);
//! none of these is fatal to the session.

use thiserror::Error;

use crate::store::StoreError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An entity invariant was violated. `field` names the offending field
    /// so the caller can surface it next to the right input.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    /// An externally supplied suggestion payload does not match the
    /// expected schema. The trip it was meant for must stay unchanged.
    #[error("malformed suggestion payload: {0}")]
    MalformedSuggestion(String),
    /// The content service failed or timed out; treated as "no suggestion".
    #[error("content service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation { field: a, reason: ra },
                Self::Validation { field: b, reason: rb },
            ) => a == b && ra == rb,
            (Self::MalformedSuggestion(a), Self::MalformedSuggestion(b)) => a == b,
            (Self::ServiceUnavailable(a), Self::ServiceUnavailable(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
