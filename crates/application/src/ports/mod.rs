//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the execution engine and external
//! systems. Each port is a trait implemented by adapters in the
//! infrastructure layer.

mod clock;
mod transport;

pub use clock::Clock;
pub use transport::{Transport, TransportFailure, TransportRequest, TransportResponse};
