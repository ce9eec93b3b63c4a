//! Pactum Domain - Core contract-testing types
//!
//! This crate defines the value types for the Pactum contract-testing
//! harness. All types here are pure Rust with no I/O dependencies.

pub mod assertion;
pub mod error;
pub mod method;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod spec;
pub mod suite;

pub use assertion::{Assertion, AssertionResult, ComparisonOperator};
pub use error::{DomainError, DomainResult};
pub use method::HttpMethod;
pub use outcome::{Headers, Outcome, OutcomeBody, TransportErrorKind};
pub use report::{SpecResult, SpecState, SuiteReport};
pub use retry::RetryPolicy;
pub use spec::RequestSpec;
pub use suite::Suite;
