//! Error taxonomy for the gateway workspace.

use thiserror::Error;

/// Unified error type for the tulay workspace.
///
/// Ordinary partner failures never surface here; they are resolved into
/// `GatewayResponse` envelopes. This type covers the conditions that do
/// legitimately propagate: malformed caller input, missing registrations on
/// administrative queries, and registry backend faults.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid input argument, rejected before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "system PHILSYS".
        what: String,
    },

    /// The system registry backend failed.
    #[error("registry failure: {0}")]
    Registry(String),
}

impl GatewayError {
    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Registry` error.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }
}

/// Closed set of transport-level failures, tagged at the point of failure.
///
/// Retryability is decided by the variant, never by matching on message
/// text: timeouts and connect failures are transient, anything else is not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The call exceeded its deadline before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The partner could not be reached (refused, DNS, socket).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be built or executed for another reason.
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether a retry has any chance of succeeding.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}
