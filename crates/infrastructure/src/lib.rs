//! Pactum Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: a reqwest-backed transport and a system clock.

pub mod adapters;

pub use adapters::{ReqwestTransport, SystemClock};
