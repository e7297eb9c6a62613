//! Registered external system configuration and its running statistics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Authentication scheme applied to outbound calls for a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AuthScheme {
    /// Partner-specific API key header carrying `api_key`.
    ApiKey,
    /// `Authorization: Bearer` header carrying `api_key`.
    Bearer,
    /// No authentication header.
    #[default]
    None,
}

/// Operational status of a registered system.
///
/// `Active` is required for dispatch; a failed call or health check moves a
/// system toward `Error` but never removes its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum SystemStatus {
    /// Healthy and accepting traffic.
    Active,
    /// Registered but administratively offline.
    #[default]
    Inactive,
    /// Inside a maintenance window; dispatch is withheld.
    Maintenance,
    /// Last call or health check failed.
    Error,
    /// Kept for audit only; never dispatched to.
    Deprecated,
}

/// Configuration row for one external partner system, keyed by `system_code`.
///
/// Created and updated by an administrative process; the gateway mutates only
/// the statistics block (on call outcomes) and the health-check fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Unique partner identifier, e.g. `PHILSYS` or `SSS_PROD`.
    pub system_code: String,
    /// Human-readable system name.
    pub system_name: String,
    /// Owning organization, e.g. `DOH` or `BSP`.
    pub organization: Option<String>,
    /// Base URL all endpoints are resolved against.
    pub base_url: String,
    /// Authentication scheme for outbound calls.
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Credential used by `ApiKey` and `Bearer` schemes.
    pub api_key: Option<String>,
    /// Partner-assigned client identifier.
    pub client_id: Option<String>,
    /// Secondary credential some partners require in a dedicated header.
    pub client_secret: Option<String>,
    /// Administrative on/off switch; checked before every dispatch.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Operational status.
    #[serde(default)]
    pub status: SystemStatus,
    /// Maximum dispatched calls in any sliding 1-minute window.
    pub rate_limit_per_minute: Option<u32>,
    /// Maximum dispatched calls in any sliding 1-hour window.
    pub rate_limit_per_hour: Option<u32>,
    /// Maximum dispatched calls in any sliding 24-hour window.
    pub rate_limit_per_day: Option<u32>,
    /// Expected cadence of health checks; staleness beyond twice this marks
    /// the system unhealthy.
    #[serde(default = "default_health_interval")]
    pub health_check_interval_minutes: u32,
    /// When the system was last probed.
    pub last_health_check: Option<DateTime<Utc>>,
    /// When a call last succeeded.
    pub last_successful_call: Option<DateTime<Utc>>,
    /// When a call last failed.
    pub last_failed_call: Option<DateTime<Utc>>,
    /// Lifetime successful call count.
    #[serde(default)]
    pub total_successful_calls: u64,
    /// Lifetime failed call count.
    #[serde(default)]
    pub total_failed_calls: u64,
    /// Exponentially weighted average latency of successful calls.
    pub average_response_time_ms: Option<f64>,
}

const fn default_true() -> bool {
    true
}

const fn default_health_interval() -> u32 {
    15
}

impl SystemConfig {
    /// Create a configuration with empty statistics and `Inactive` status.
    #[must_use]
    pub fn new(
        system_code: impl Into<String>,
        system_name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            system_code: system_code.into(),
            system_name: system_name.into(),
            organization: None,
            base_url: base_url.into(),
            auth_scheme: AuthScheme::None,
            api_key: None,
            client_id: None,
            client_secret: None,
            is_active: true,
            status: SystemStatus::Inactive,
            rate_limit_per_minute: None,
            rate_limit_per_hour: None,
            rate_limit_per_day: None,
            health_check_interval_minutes: default_health_interval(),
            last_health_check: None,
            last_successful_call: None,
            last_failed_call: None,
            total_successful_calls: 0,
            total_failed_calls: 0,
            average_response_time_ms: None,
        }
    }

    /// Whether the system may be dispatched to right now.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_active && self.status == SystemStatus::Active
    }

    /// Whether the system is `Active` with a sufficiently recent health check.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        if self.status != SystemStatus::Active {
            return false;
        }
        let max_age = Duration::minutes(i64::from(self.health_check_interval_minutes) * 2);
        self.last_health_check
            .is_some_and(|checked| checked > Utc::now() - max_age)
    }

    /// Lifetime success rate as a percentage of all completed calls.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.total_successful_calls + self.total_failed_calls;
        if total == 0 {
            return 0.0;
        }
        self.total_successful_calls as f64 / total as f64 * 100.0
    }

    /// Record a successful call and fold its latency into the running average.
    pub fn record_successful_call(&mut self, response_time_ms: u64) {
        self.total_successful_calls += 1;
        self.last_successful_call = Some(Utc::now());
        let sample = response_time_ms as f64;
        self.average_response_time_ms = Some(match self.average_response_time_ms {
            // Moving average weighted toward history.
            Some(avg) => avg * 0.9 + sample * 0.1,
            None => sample,
        });
    }

    /// Record a failed call.
    pub fn record_failed_call(&mut self) {
        self.total_failed_calls += 1;
        self.last_failed_call = Some(Utc::now());
    }

    /// Compare observed window counts against the configured thresholds.
    ///
    /// A `None` threshold leaves that window uncapped.
    #[must_use]
    pub fn rate_limit_exceeded(
        &self,
        calls_last_minute: u32,
        calls_last_hour: u32,
        calls_last_day: u32,
    ) -> bool {
        if let Some(limit) = self.rate_limit_per_minute
            && calls_last_minute >= limit
        {
            return true;
        }
        if let Some(limit) = self.rate_limit_per_hour
            && calls_last_hour >= limit
        {
            return true;
        }
        if let Some(limit) = self.rate_limit_per_day
            && calls_last_day >= limit
        {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_response_time_uses_ewma() {
        let mut cfg = SystemConfig::new("SSS", "Social Security System", "https://sss.example");
        cfg.record_successful_call(100);
        assert_eq!(cfg.average_response_time_ms, Some(100.0));
        cfg.record_successful_call(200);
        assert_eq!(cfg.average_response_time_ms, Some(100.0 * 0.9 + 200.0 * 0.1));
    }

    #[test]
    fn success_rate_is_percentage_of_completed_calls() {
        let mut cfg = SystemConfig::new("BIR", "Bureau of Internal Revenue", "https://bir.example");
        assert_eq!(cfg.success_rate(), 0.0);
        cfg.record_successful_call(10);
        cfg.record_successful_call(10);
        cfg.record_failed_call();
        cfg.record_failed_call();
        assert_eq!(cfg.success_rate(), 50.0);
    }

    #[test]
    fn uncapped_windows_never_limit() {
        let cfg = SystemConfig::new("LGU", "LGU Portal", "https://lgu.example");
        assert!(!cfg.rate_limit_exceeded(u32::MAX, u32::MAX, u32::MAX));
    }

    #[test]
    fn any_exceeded_window_limits() {
        let mut cfg = SystemConfig::new("BSP", "Bangko Sentral", "https://bsp.example");
        cfg.rate_limit_per_minute = Some(10);
        cfg.rate_limit_per_hour = Some(100);
        assert!(!cfg.rate_limit_exceeded(9, 99, 0));
        assert!(cfg.rate_limit_exceeded(10, 0, 0));
        assert!(cfg.rate_limit_exceeded(0, 100, 0));
    }
}
