//! Request and response envelopes exchanged between callers and the gateway.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// HTTP method of an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Idempotent read; the only cacheable method.
    Get,
    /// Create / submit.
    Post,
    /// Replace.
    Put,
    /// Remove.
    Delete,
    /// Partial update.
    Patch,
    /// Headers only.
    Head,
}

impl Method {
    /// Canonical uppercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized HTTP method string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized HTTP method: {0}")]
pub struct InvalidMethod(pub String);

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            other => Err(InvalidMethod(other.to_string())),
        }
    }
}

/// Closed set of gateway outcome codes surfaced in failure envelopes.
///
/// Callers branch on these to distinguish "never retry" configuration
/// problems, "retry later" pressure signals, and permanently invalid
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// No configuration registered under the requested system code.
    SystemNotFound,
    /// The system is administratively switched off.
    SystemInactive,
    /// The system is registered and switched on but not in `Active` status.
    SystemUnavailable,
    /// The gateway's own sliding-window limiter rejected the call.
    RateLimitExceeded,
    /// The partner answered with a non-2xx status.
    HttpError,
    /// The partner could not be reached (connect failure or timeout).
    ConnectionError,
    /// Every configured attempt was consumed without success.
    RetryExhausted,
    /// A classified-fatal failure short-circuited the retry loop.
    NonRetryableError,
    /// Unexpected internal fault; details are logged, not leaked.
    InternalError,
}

impl ErrorCode {
    /// Canonical wire form, e.g. `SYSTEM_NOT_FOUND`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SystemNotFound => "SYSTEM_NOT_FOUND",
            Self::SystemInactive => "SYSTEM_INACTIVE",
            Self::SystemUnavailable => "SYSTEM_UNAVAILABLE",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::HttpError => "HTTP_ERROR",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::RetryExhausted => "RETRY_EXHAUSTED",
            Self::NonRetryableError => "NON_RETRYABLE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical outbound call, immutable once constructed.
///
/// The resilience layer may dispatch a request physically more than once;
/// the envelope itself never changes between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Target system code.
    pub system_code: String,
    /// Partner-relative endpoint path, e.g. `/members/verify`.
    pub endpoint: String,
    /// HTTP method.
    pub method: Method,
    /// Caller-supplied headers, merged over the gateway baseline.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Opaque payload; the gateway never inspects it.
    pub body: Option<Value>,
    /// Caller request identifier, forwarded as `X-Request-ID`.
    pub request_id: Option<String>,
    /// Cross-service correlation identifier, forwarded as `X-Correlation-ID`.
    pub correlation_id: Option<String>,
    /// Acting user, forwarded as `X-User-ID`.
    pub user_id: Option<String>,
}

impl GatewayRequest {
    /// Create a request for `system_code` with no body or metadata.
    #[must_use]
    pub fn new(
        system_code: impl Into<String>,
        method: Method,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            system_code: system_code.into(),
            endpoint: endpoint.into(),
            method,
            headers: HashMap::new(),
            body: None,
            request_id: None,
            correlation_id: None,
            user_id: None,
        }
    }

    /// Attach a JSON payload.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add one caller header; later values overwrite the gateway baseline.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the request identifier.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Set the correlation identifier.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Set the acting user identifier.
    #[must_use]
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }
}

/// Uniform response envelope; ordinary partner failures are values, never
/// panics or errors.
///
/// Invariant: `success == true` implies a 2xx `status_code` and no
/// `error_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Whether the partner answered with a 2xx status.
    pub success: bool,
    /// Partner HTTP status; `None` when the call never reached a partner.
    pub status_code: Option<u16>,
    /// Response headers as returned by the partner.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Response payload, if any.
    pub body: Option<Value>,
    /// Failure classification; `None` on success.
    pub error_code: Option<ErrorCode>,
    /// Human-readable failure detail; `None` on success.
    pub error_message: Option<String>,
    /// Wall-clock latency of the dispatched call.
    pub response_time_ms: Option<u64>,
    /// System the envelope concerns.
    pub system_code: String,
    /// When the envelope was produced.
    pub timestamp: DateTime<Utc>,
}

impl GatewayResponse {
    /// Build an envelope from a partner HTTP exchange.
    ///
    /// `success` mirrors the status class; non-2xx replies keep their body
    /// and are tagged [`ErrorCode::HttpError`].
    #[must_use]
    pub fn from_http(
        system_code: impl Into<String>,
        status_code: u16,
        headers: HashMap<String, String>,
        body: Option<Value>,
        response_time_ms: u64,
    ) -> Self {
        let success = (200..300).contains(&status_code);
        Self {
            success,
            status_code: Some(status_code),
            headers,
            body,
            error_code: (!success).then_some(ErrorCode::HttpError),
            error_message: (!success).then(|| format!("HTTP {status_code} response")),
            response_time_ms: Some(response_time_ms),
            system_code: system_code.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build a failure envelope for an outcome with no partner HTTP status.
    #[must_use]
    pub fn failure(
        system_code: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            status_code: None,
            headers: HashMap::new(),
            body: None,
            error_code: Some(code),
            error_message: Some(message.into()),
            response_time_ms: None,
            system_code: system_code.into(),
            timestamp: Utc::now(),
        }
    }
}
