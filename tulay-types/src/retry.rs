//! Retry and backoff configuration resolved per system code.

use serde::{Deserialize, Serialize};

/// Retry behavior for one system, immutable once resolved for a call.
///
/// `max_retries` is the total attempt budget, not the number of re-tries
/// after the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts before the call is reported exhausted.
    pub max_retries: u32,
    /// Delay before the second attempt.
    pub base_delay_ms: u64,
    /// Ceiling applied to the computed exponential delay.
    pub max_delay_ms: u64,
    /// Exponential growth factor between attempts.
    pub backoff_multiplier: f64,
    /// Per-attempt deadline; an elapsed attempt counts as a retryable
    /// timeout failure.
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    /// Conservative default for partners with no dedicated policy.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            timeout_ms: 20_000,
        }
    }
}
