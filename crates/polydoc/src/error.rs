//! Error taxonomy shared by the document tree, codecs and validators.

use crate::mark::ParseMark;
use crate::node::{Float, Int};
use thiserror::Error;

/// Result type alias for polydoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the document tree, the codecs and the validators.
///
/// The taxonomy is deliberately flat. Every variant carries enough context
/// to locate the failure: the identifier of the offending node where one
/// exists, and a [`ParseMark`] for import failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An accessor or operation was used against the wrong node tag.
    #[error("data type mismatch")]
    TypeMismatch { node_id: Option<u32> },

    /// An unsigned value does not fit the signed 64-bit payload.
    #[error("narrowing from unsigned to signed generates overflow")]
    Overflow,

    /// A sequence index or map key was absent where lookup (not insertion)
    /// was requested.
    #[error("key '{key}' not found in sequence or map")]
    KeyNotFound { key: String, node_id: Option<u32> },

    /// Map initialization data contained the same key twice.
    #[error("key '{key}' exists more than once in initialization data")]
    DuplicateKey { key: String },

    /// Malformed JSON/YAML text, or an unreadable input file.
    #[error("{message}, {mark}")]
    Import { message: String, mark: ParseMark },

    /// A validator rule was not met.
    #[error("{message}")]
    Validation { message: String, node_id: Option<u32> },

    /// An integer range rule was not met.
    #[error("value out of bounds: range [{min}:{max}], actual {actual}")]
    IntRange {
        min: Int,
        max: Int,
        actual: Int,
        node_id: Option<u32>,
    },

    /// A floating point range rule was not met.
    #[error("value out of bounds: range [{min}:{max}], actual {actual}")]
    FloatRange {
        min: Float,
        max: Float,
        actual: Float,
        node_id: Option<u32>,
    },

    /// Catch-all for failures outside the taxonomy above, e.g. a stream
    /// write error during export.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// The identifier of the node the error refers to, where one exists.
    pub fn node_id(&self) -> Option<u32> {
        match self {
            Error::TypeMismatch { node_id }
            | Error::KeyNotFound { node_id, .. }
            | Error::Validation { node_id, .. }
            | Error::IntRange { node_id, .. }
            | Error::FloatRange { node_id, .. } => *node_id,
            _ => None,
        }
    }

    /// The source position the error refers to, where one exists.
    pub fn parse_mark(&self) -> Option<&ParseMark> {
        match self {
            Error::Import { mark, .. } => Some(mark),
            _ => None,
        }
    }
}
