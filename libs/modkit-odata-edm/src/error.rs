//! Error taxonomy for EDM type mapping and model introspection.
//!
//! Capability denials (not filterable, limit exceeded, ...) are *not* errors here:
//! they are answered with `bool`/`Option` values and turned into protocol errors by
//! the validation layer. Likewise a missing mapping is `None`, never an error.

use thiserror::Error;

/// Unified error type for the EDM layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EdmError {
    /// An element id does not belong to the model it was used with.
    #[error("unknown {kind}: {id}")]
    UnknownElement { kind: &'static str, id: String },

    /// More than one native type matches an EDM schema element.
    #[error("multiple native types match EDM type '{edm_type}': {}", .candidates.join(", "))]
    AmbiguousNativeType {
        edm_type: String,
        candidates: Vec<String>,
    },

    /// The same native type is annotated on more than one schema type.
    #[error("native type '{native}' annotated on several types: {}", .candidates.join(", "))]
    AmbiguousSchemaType {
        native: String,
        candidates: Vec<String>,
    },

    /// A case-insensitive lookup matched more than one navigation source.
    #[error("multiple navigation sources match '{identifier}': {}", .candidates.join(", "))]
    AmbiguousNavigationSource {
        identifier: String,
        candidates: Vec<String>,
    },

    /// A case-insensitive lookup matched operations with different names.
    #[error("multiple operations match '{identifier}': {}", .candidates.join(", "))]
    AmbiguousOperation {
        identifier: String,
        candidates: Vec<String>,
    },

    /// The model builder rejected the model definition.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Configuration could not be extracted or applied.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EdmError {
    #[must_use]
    pub fn unknown(kind: &'static str, id: impl ToString) -> Self {
        Self::UnknownElement {
            kind,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }

    /// Returns `true` for the ambiguity family of errors.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousNativeType { .. }
                | Self::AmbiguousSchemaType { .. }
                | Self::AmbiguousNavigationSource { .. }
                | Self::AmbiguousOperation { .. }
        )
    }
}

pub type EdmResult<T> = Result<T, EdmError>;
