//! tulay-mock
//!
//! Deterministic doubles for gateway tests: an in-memory [`MockRegistry`]
//! and a scripted [`MockTransport`] whose behavior is driven from the
//! outside, so retry, timeout, and batch paths can be exercised without a
//! network.
#![warn(missing_docs)]

mod registry;
mod transport;

pub use registry::{MockRegistry, active_system};
pub use transport::{MockBehavior, MockTransport};
