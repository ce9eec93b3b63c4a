//! Application error types

use pactum_domain::DomainError;
use thiserror::Error;

/// Errors the executor can surface for a single spec.
///
/// Transport failures are not errors at this level: they are carried
/// inside the returned outcome so the runner can mark the spec errored
/// without aborting the suite.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The spec could not be turned into a request (unresolved
    /// placeholder, invalid URL). Aborts only the offending spec.
    #[error("configuration error: {0}")]
    Configuration(#[from] DomainError),
}

/// Errors that abort a run before any spec is dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The suite definition is invalid (blank or duplicate spec ids).
    #[error("invalid suite: {0}")]
    InvalidSuite(#[from] DomainError),

    /// The requested concurrency is zero.
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}
