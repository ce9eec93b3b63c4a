//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while validating or resolving a spec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The resolved URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A URL template placeholder has no matching parameter.
    #[error("unresolved placeholder '{name}' in spec '{spec_id}'")]
    UnresolvedPlaceholder {
        /// Id of the offending spec.
        spec_id: String,
        /// Placeholder name without braces.
        name: String,
    },

    /// A spec identifier is empty.
    #[error("spec id must not be empty")]
    EmptySpecId,

    /// Two specs in one suite share an identifier.
    #[error("duplicate spec id '{0}' in suite")]
    DuplicateSpecId(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
