//! Tulay routes outbound requests from internal registry services to the
//! external government and financial systems they integrate with.
//!
//! Overview
//! - One uniform request/response contract (`GatewayRequest` in,
//!   `GatewayResponse` out) across a dozen-plus divergent partner APIs.
//! - Per-partner authentication and header conventions resolved from a
//!   static profile table keyed by system-code prefix.
//! - Sliding-window rate limiting, short-TTL caching of successful reads,
//!   and live per-partner statistics, all re-read from the registry on every
//!   call so administrative changes take effect immediately.
//! - A resilience layer with per-attempt timeouts, exponential backoff with
//!   jitter, and retryable-vs-fatal classification; a batch coordinator that
//!   fans independent requests out concurrently and joins every outcome.
//!
//! Ordinary partner failures never raise: callers always receive an envelope
//! whose `error_code` distinguishes "never try this partner"
//! (`SYSTEM_NOT_FOUND`, `SYSTEM_INACTIVE`) from "try again later"
//! (`RATE_LIMIT_EXCEEDED`, `RETRY_EXHAUSTED`) from "this request is
//! permanently invalid" (`HTTP_ERROR` on a 4xx). The only error that
//! propagates is malformed input to the gateway itself.
//!
//! Building a gateway:
//! ```rust,ignore
//! use std::sync::Arc;
//! use tulay::{Gateway, GatewayRequest, Method};
//! use tulay_http::ReqwestTransport;
//!
//! let gateway = Gateway::builder()
//!     .registry(registry)
//!     .transport(Arc::new(ReqwestTransport::new()))
//!     .build()?;
//!
//! let request = GatewayRequest::new("PHILSYS", Method::Post, "/verify")
//!     .with_body(serde_json::json!({"psn": "123456789012"}))
//!     .with_correlation_id("reg-2024-000123");
//! let response = gateway.dispatch_with_retry("PHILSYS", &request).await?;
//! ```
#![warn(missing_docs)]

mod admin;
mod batch;
pub(crate) mod core;
mod dispatch;
mod metrics;
mod resilience;

pub use crate::core::{Gateway, GatewayBuilder};

// Re-export the seams and envelope types callers need.
pub use tulay_core::{
    GatewayError, HttpTransport, OutboundRequest, RawResponse, SystemRegistry, TransportError,
};
pub use tulay_types::{
    AuthScheme, ErrorCode, GatewayRequest, GatewayResponse, HealthReport, HealthSnapshot,
    HealthStatus, Method, RetryPolicy, SystemConfig, SystemStatistics, SystemStatus, SystemSummary,
};
