//! tulay-core
//!
//! Core traits and utilities shared across the tulay gateway workspace.
//!
//! - `error`: the unified [`GatewayError`] and the closed [`TransportError`]
//!   failure set the resilience layer classifies on.
//! - `registry`: the [`SystemRegistry`] persistence seam for registered
//!   external systems.
//! - `transport`: the [`HttpTransport`] seam the dispatcher executes calls
//!   through, kept narrow so tests can script it.
//! - `profile`: the static per-partner dispatch profile table (header naming
//!   conventions, path prefixes, content negotiation).
//! - `headers`: outbound header assembly and URL joining.
#![warn(missing_docs)]

pub mod error;
pub mod headers;
pub mod profile;
pub mod registry;
pub mod transport;

pub use error::{GatewayError, TransportError};
pub use headers::{build_headers, join_url};
pub use profile::{SystemProfile, profile_for};
pub use registry::SystemRegistry;
pub use transport::{HttpTransport, OutboundRequest, RawResponse};
