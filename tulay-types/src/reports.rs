//! Observability snapshots returned by the gateway's administrative queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::system::SystemStatus;

/// Outcome of an on-demand health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// Probe reached the partner and it answered 2xx.
    Healthy,
    /// Probe reached out but the partner failed to answer cleanly.
    Unhealthy,
    /// No system registered under the queried code.
    NotFound,
}

/// Report produced by `Gateway::health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// System the probe targeted.
    pub system_code: String,
    /// Probe outcome.
    pub status: HealthStatus,
    /// HTTP status of the probe reply, when one arrived.
    pub http_status: Option<u16>,
    /// Probe latency.
    pub response_time_ms: Option<u64>,
    /// Failure detail for unhealthy probes.
    pub error: Option<String>,
    /// When the probe ran.
    pub checked_at: DateTime<Utc>,
    /// Registered system name, when found.
    pub system_name: Option<String>,
    /// Owning organization, when found.
    pub organization: Option<String>,
    /// Lifetime success rate (percentage) from the registry row.
    pub success_rate: Option<f64>,
    /// Running average latency from the registry row.
    pub average_response_time_ms: Option<f64>,
}

/// Full statistics snapshot of one registry row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatistics {
    /// System code.
    pub system_code: String,
    /// System name.
    pub system_name: String,
    /// Owning organization.
    pub organization: Option<String>,
    /// Current status.
    pub status: SystemStatus,
    /// Administrative switch.
    pub is_active: bool,
    /// Lifetime successful calls.
    pub total_successful_calls: u64,
    /// Lifetime failed calls.
    pub total_failed_calls: u64,
    /// Lifetime success rate (percentage).
    pub success_rate: f64,
    /// Running average latency of successful calls.
    pub average_response_time_ms: Option<f64>,
    /// Timestamp of the last successful call.
    pub last_successful_call: Option<DateTime<Utc>>,
    /// Timestamp of the last failed call.
    pub last_failed_call: Option<DateTime<Utc>>,
    /// Timestamp of the last health probe.
    pub last_health_check: Option<DateTime<Utc>>,
}

/// One row of `Gateway::list_systems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSummary {
    /// System code.
    pub system_code: String,
    /// System name.
    pub system_name: String,
    /// Owning organization.
    pub organization: Option<String>,
    /// Current status.
    pub status: SystemStatus,
    /// Administrative switch.
    pub is_active: bool,
    /// Whether the system is active with a recent health check.
    pub is_healthy: bool,
    /// Lifetime success rate (percentage).
    pub success_rate: f64,
    /// Timestamp of the last health probe.
    pub last_health_check: Option<DateTime<Utc>>,
}

/// In-memory resilience counters for one system, reset on process restart.
///
/// `success_rate` here is a ratio of successes to attempts (a physical
/// attempt may be retried several times inside one logical call), unlike the
/// registry's percentage over completed calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// System code.
    pub system_code: String,
    /// Physical dispatch attempts.
    pub total_attempts: u64,
    /// Logical calls that ended in success.
    pub total_successes: u64,
    /// Logical calls that exhausted their retry budget.
    pub total_failures: u64,
    /// Logical calls terminated by a classified-fatal failure.
    pub total_non_retryable_failures: u64,
    /// successes / attempts, in `[0, 1]`.
    pub success_rate: f64,
    /// Cumulative response time divided by terminal outcomes.
    pub average_response_time_ms: f64,
    /// Last attempt timestamp.
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last success timestamp.
    pub last_success: Option<DateTime<Utc>>,
    /// Last failure timestamp.
    pub last_failure: Option<DateTime<Utc>>,
    /// Resolved retry policy, populated on detailed snapshots.
    pub retry_policy: Option<RetryPolicy>,
}
