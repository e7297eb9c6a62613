//! tulay-http
//!
//! Reqwest-backed implementation of the [`HttpTransport`] seam. Failures are
//! classified into the closed [`TransportError`] set at the point of
//! failure; a non-2xx partner response is returned as a normal
//! [`RawResponse`], never as an error.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use tulay_core::{HttpTransport, OutboundRequest, RawResponse, TransportError};
use tulay_types::Method;

/// Fallback per-call deadline when a request carries no explicit timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`HttpTransport`] over a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Create a transport with the default per-call timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom default per-call timeout.
    ///
    /// The resilience layer usually supplies a per-attempt timeout on each
    /// [`OutboundRequest`]; this default only bounds calls without one.
    #[must_use]
    pub fn with_timeout(default_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            default_timeout,
        }
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

fn classify(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let url =
            Url::parse(&request.url).map_err(|e| TransportError::Request(e.to_string()))?;

        let mut builder = self
            .client
            .request(Self::method(request.method), url)
            .timeout(request.timeout.unwrap_or(self.default_timeout));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| classify(&e))?;
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.entry(name.to_string()).or_insert_with(|| v.to_string());
            }
        }

        let text = response.text().await.map_err(|e| classify(&e))?;
        let body = if text.is_empty() {
            None
        } else {
            // Partners are JSON by convention; anything else rides along verbatim.
            Some(serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text)))
        };

        tracing::debug!(url = %request.url, status, "outbound call completed");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
