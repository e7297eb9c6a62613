//! Outbound HTTP execution seam.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use tulay_types::Method;

use crate::error::TransportError;

/// A fully assembled outbound call, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// Absolute URL (base, partner prefix, and endpoint already joined).
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Complete header set, auth included.
    pub headers: HashMap<String, String>,
    /// JSON payload, if any.
    pub body: Option<Value>,
    /// Per-call deadline override; `None` uses the transport default.
    pub timeout: Option<Duration>,
}

/// Raw result of one physical HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (first value per name).
    pub headers: HashMap<String, String>,
    /// Decoded body: JSON when the partner sent JSON, a string otherwise.
    pub body: Option<Value>,
}

/// Executes physical HTTP calls.
///
/// Implementations classify failures into the closed [`TransportError`] set
/// at the point of failure; callers branch on the tag, never on message
/// text. A non-2xx response is not an error at this layer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one call and return the partner's raw response.
    async fn execute(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}
