//! The dispatcher: one physical routing pass per call.

use std::time::Instant;

use tulay_core::{GatewayError, OutboundRequest, build_headers, join_url, profile_for};
use tulay_types::{ErrorCode, GatewayRequest, GatewayResponse, Method};

use crate::core::Gateway;

impl Gateway {
    /// Route one request to its external system and return the outcome as an
    /// envelope.
    ///
    /// Ordinary partner failures (unknown system, rate limiting, non-2xx
    /// replies, unreachable hosts) are returned as `success == false`
    /// envelopes; only malformed input errors.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the request carries an empty system code.
    pub async fn route(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let system_code = request.system_code.trim();
        if system_code.is_empty() {
            return Err(GatewayError::invalid_arg("system code cannot be empty"));
        }

        let config = match self.registry.find_by_system_code(system_code).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                return Ok(GatewayResponse::failure(
                    system_code,
                    ErrorCode::SystemNotFound,
                    format!("external system not found: {system_code}"),
                ));
            }
            Err(err) => {
                tracing::error!(system = %system_code, error = %err, "registry lookup failed");
                return Ok(GatewayResponse::failure(
                    system_code,
                    ErrorCode::InternalError,
                    "internal error resolving system configuration",
                ));
            }
        };

        if !config.is_active {
            return Ok(GatewayResponse::failure(
                system_code,
                ErrorCode::SystemInactive,
                format!("system is not active: {}", config.system_name),
            ));
        }
        if !config.is_available() {
            return Ok(GatewayResponse::failure(
                system_code,
                ErrorCode::SystemUnavailable,
                format!("system is not available: {}", config.system_name),
            ));
        }

        if self.rate_limiter.is_exceeded(&config) {
            tracing::warn!(system = %system_code, "rate limit exceeded, call rejected");
            return Ok(GatewayResponse::failure(
                system_code,
                ErrorCode::RateLimitExceeded,
                format!("rate limit exceeded for system: {}", config.system_name),
            ));
        }

        if request.method == Method::Get
            && let Some(hit) = self.cache.get(system_code, &request.endpoint).await
        {
            tracing::debug!(system = %system_code, endpoint = %request.endpoint, "cache hit");
            return Ok(hit);
        }

        let profile = profile_for(system_code);
        let outbound = OutboundRequest {
            url: join_url(&config.base_url, profile.path_prefix, &request.endpoint),
            method: request.method,
            headers: build_headers(&config, request, profile),
            body: request.body.clone(),
            timeout: None,
        };

        // Only calls that actually go out consume rate-limit budget.
        self.rate_limiter.record(system_code);

        let start = Instant::now();
        match self.transport.execute(outbound).await {
            Ok(raw) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                let response = GatewayResponse::from_http(
                    system_code,
                    raw.status,
                    raw.headers,
                    raw.body,
                    elapsed_ms,
                );
                self.record_outcome(system_code, response.success, elapsed_ms)
                    .await;
                if response.success && request.method == Method::Get {
                    self.cache
                        .put(system_code, &request.endpoint, &response)
                        .await;
                }
                tracing::info!(
                    system = %system_code,
                    status = raw.status,
                    elapsed_ms,
                    "routed request"
                );
                Ok(response)
            }
            Err(err) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                self.record_outcome(system_code, false, elapsed_ms).await;
                tracing::warn!(system = %system_code, error = %err, "outbound call failed");
                let code = if err.is_retryable() {
                    ErrorCode::ConnectionError
                } else {
                    ErrorCode::NonRetryableError
                };
                Ok(GatewayResponse::failure(
                    system_code,
                    code,
                    format!("failed to reach {}: {err}", config.system_name),
                ))
            }
        }
    }

    async fn record_outcome(&self, system_code: &str, success: bool, elapsed_ms: u64) {
        if let Err(err) = self
            .registry
            .record_outcome(system_code, success, elapsed_ms)
            .await
        {
            tracing::warn!(system = %system_code, error = %err, "failed to record call outcome");
        }
    }
}
