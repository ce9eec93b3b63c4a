//! Pactum Application - Contract-test execution engine
//!
//! This crate orchestrates suite runs: URL template resolution, spec
//! execution with retry/backoff through the [`ports::Transport`] port,
//! assertion evaluation, and report aggregation. Adapters for the ports
//! live in `pactum-infrastructure`.

pub mod assertions;
pub mod error;
pub mod executor;
pub mod ports;
pub mod runner;
pub mod template;

pub use assertions::AssertionEngine;
pub use error::{ExecutorError, RunnerError};
pub use executor::HttpExecutor;
pub use runner::SuiteRunner;
