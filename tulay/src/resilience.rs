//! Retry, backoff, and timeout handling around the dispatcher.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;

use tulay_core::GatewayError;
use tulay_types::{ErrorCode, GatewayRequest, GatewayResponse, RetryPolicy};

use crate::core::Gateway;

/// Per-system retry policies: caller overrides first, then the built-in
/// table, resolved once per system code and cached for the process lifetime.
pub(crate) struct RetryPolicies {
    overrides: HashMap<String, RetryPolicy>,
    resolved: Mutex<HashMap<String, RetryPolicy>>,
}

impl RetryPolicies {
    pub(crate) fn new(overrides: HashMap<String, RetryPolicy>) -> Self {
        Self {
            overrides,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn resolve(&self, system_code: &str) -> RetryPolicy {
        let key = system_code.trim().to_ascii_uppercase();
        let mut cache = self.resolved.lock().expect("policy lock poisoned");
        if let Some(policy) = cache.get(&key) {
            return *policy;
        }
        let policy = self
            .overrides
            .get(&key)
            .copied()
            .unwrap_or_else(|| builtin_policy(&key));
        cache.insert(key, policy);
        policy
    }
}

/// Built-in table: the national identity system warrants the most patience,
/// the big social-insurance systems a bit less, everyone else the
/// conservative default.
fn builtin_policy(code: &str) -> RetryPolicy {
    if code.starts_with("PHILSYS") {
        RetryPolicy {
            max_retries: 5,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            timeout_ms: 60_000,
        }
    } else if code.starts_with("SSS") || code.starts_with("GSIS") || code.starts_with("PHILHEALTH")
    {
        RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 15_000,
            backoff_multiplier: 2.0,
            timeout_ms: 30_000,
        }
    } else {
        RetryPolicy::default()
    }
}

/// Pre-jitter exponential delay before the attempt following `attempt`.
pub(crate) fn backoff_delay_ms(attempt: u32, policy: &RetryPolicy) -> u64 {
    let exponent = attempt.saturating_sub(1);
    let delay = policy.base_delay_ms as f64 * policy.backoff_multiplier.powi(exponent as i32);
    (delay as u64).min(policy.max_delay_ms)
}

/// Add up to 10% random jitter so concurrently failing callers do not retry
/// in lockstep.
pub(crate) fn with_jitter(delay_ms: u64) -> u64 {
    let jitter_range = std::cmp::max(1, delay_ms / 10);
    let mut rng = rand::rng();
    delay_ms + rng.random_range(0..jitter_range)
}

/// Whether a failed envelope is worth another attempt: partner 5xx/429/408
/// replies and transport-class failures are; everything else short-circuits.
fn is_retryable(response: &GatewayResponse) -> bool {
    if response.success {
        return false;
    }
    if let Some(status) = response.status_code
        && ((500..600).contains(&status) || status == 429 || status == 408)
    {
        return true;
    }
    matches!(response.error_code, Some(ErrorCode::ConnectionError))
}

impl Gateway {
    /// Route a request with the system's retry policy applied.
    ///
    /// Each attempt runs under the policy's per-attempt timeout; an elapsed
    /// attempt counts as a retryable failure. Attempts are strictly
    /// sequential, and the backoff sleep between them blocks only this
    /// logical call's task. On exhaustion the caller receives a
    /// `RETRY_EXHAUSTED` envelope carrying the last failure's message; a
    /// non-retryable failure returns immediately with its own code.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `system_code` is empty.
    pub async fn dispatch_with_retry(
        &self,
        system_code: &str,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let code = system_code.trim();
        if code.is_empty() {
            return Err(GatewayError::invalid_arg("system code cannot be empty"));
        }

        let policy = self.policies.resolve(code);
        let attempt_timeout = Duration::from_millis(policy.timeout_ms);
        let started = Instant::now();
        let mut last_error: Option<String> = None;

        for attempt in 1..=policy.max_retries {
            self.health.record_attempt(code);
            tracing::debug!(system = %code, attempt, max = policy.max_retries, "dispatching");

            match tokio::time::timeout(attempt_timeout, self.route(request)).await {
                Ok(Ok(response)) if response.success => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    self.health.record_success(code, elapsed_ms);
                    tracing::info!(system = %code, attempt, elapsed_ms, "request succeeded");
                    return Ok(response);
                }
                Ok(Ok(response)) => {
                    if !is_retryable(&response) {
                        self.health.record_non_retryable(code);
                        tracing::warn!(
                            system = %code,
                            error_code = response.error_code.map(|c| c.as_str()),
                            "non-retryable failure"
                        );
                        return Ok(response);
                    }
                    last_error = response
                        .error_message
                        .clone()
                        .or_else(|| response.status_code.map(|s| format!("HTTP {s} response")));
                }
                Ok(Err(err)) => return Err(err),
                Err(_) => {
                    tracing::warn!(
                        system = %code,
                        attempt,
                        timeout_ms = policy.timeout_ms,
                        "attempt timed out"
                    );
                    last_error = Some(format!("attempt timed out after {}ms", policy.timeout_ms));
                }
            }

            if attempt < policy.max_retries {
                let delay = with_jitter(backoff_delay_ms(attempt, &policy));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.health.record_failure(code, elapsed_ms);
        tracing::error!(
            system = %code,
            attempts = policy.max_retries,
            elapsed_ms,
            "all attempts failed"
        );
        Ok(GatewayResponse::failure(
            code,
            ErrorCode::RetryExhausted,
            format!(
                "failed after {} attempts: {}",
                policy.max_retries,
                last_error.as_deref().unwrap_or("unknown error")
            ),
        ))
    }
}
