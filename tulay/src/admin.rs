//! Administrative and observability operations.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;

use tulay_core::{GatewayError, OutboundRequest, join_url};
use tulay_types::{
    HealthReport, HealthSnapshot, HealthStatus, Method, SystemStatistics, SystemSummary,
};

use crate::core::Gateway;

impl Gateway {
    /// Probe one system's health endpoint and record the result.
    ///
    /// The probe is a plain GET of the configured health path against the
    /// partner's base URL, straight through the transport: it neither
    /// consumes rate-limit budget nor touches the cache. A 2xx reply is
    /// healthy; anything else, including transport failures, is not.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty system code or `Registry` when the
    /// backing store fails.
    pub async fn health(&self, system_code: &str) -> Result<HealthReport, GatewayError> {
        let code = system_code.trim();
        if code.is_empty() {
            return Err(GatewayError::invalid_arg("system code cannot be empty"));
        }

        let Some(config) = self.registry.find_by_system_code(code).await? else {
            return Ok(HealthReport {
                system_code: code.to_string(),
                status: HealthStatus::NotFound,
                http_status: None,
                response_time_ms: None,
                error: Some(format!("system not found: {code}")),
                checked_at: Utc::now(),
                system_name: None,
                organization: None,
                success_rate: None,
                average_response_time_ms: None,
            });
        };

        let probe = OutboundRequest {
            url: join_url(&config.base_url, "", &self.health_endpoint),
            method: Method::Get,
            headers: HashMap::new(),
            body: None,
            timeout: None,
        };

        let start = Instant::now();
        let (status, http_status, response_time_ms, error) =
            match self.transport.execute(probe).await {
                Ok(raw) => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    let healthy = (200..300).contains(&raw.status);
                    let error = (!healthy).then(|| format!("HTTP {} from health probe", raw.status));
                    let status = if healthy {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unhealthy
                    };
                    (status, Some(raw.status), Some(elapsed_ms), error)
                }
                Err(err) => (HealthStatus::Unhealthy, None, None, Some(err.to_string())),
            };

        let healthy = status == HealthStatus::Healthy;
        if let Err(err) = self.registry.record_health_check(code, healthy).await {
            tracing::warn!(system = %code, error = %err, "failed to record health check");
        }
        tracing::info!(system = %code, healthy, "health probe completed");

        Ok(HealthReport {
            system_code: code.to_string(),
            status,
            http_status,
            response_time_ms,
            error,
            checked_at: Utc::now(),
            system_name: Some(config.system_name.clone()),
            organization: config.organization.clone(),
            success_rate: Some(config.success_rate()),
            average_response_time_ms: config.average_response_time_ms,
        })
    }

    /// Full statistics snapshot of one registry row.
    ///
    /// # Errors
    /// Returns `NotFound` for unregistered codes and `Registry` when the
    /// backing store fails.
    pub async fn statistics(&self, system_code: &str) -> Result<SystemStatistics, GatewayError> {
        let config = self
            .registry
            .find_by_system_code(system_code)
            .await?
            .ok_or_else(|| GatewayError::not_found(format!("system {system_code}")))?;

        Ok(SystemStatistics {
            system_code: config.system_code.clone(),
            system_name: config.system_name.clone(),
            organization: config.organization.clone(),
            status: config.status,
            is_active: config.is_active,
            total_successful_calls: config.total_successful_calls,
            total_failed_calls: config.total_failed_calls,
            success_rate: config.success_rate(),
            average_response_time_ms: config.average_response_time_ms,
            last_successful_call: config.last_successful_call,
            last_failed_call: config.last_failed_call,
            last_health_check: config.last_health_check,
        })
    }

    /// Summaries of every registered system.
    ///
    /// # Errors
    /// Returns `Registry` when the backing store fails.
    pub async fn list_systems(&self) -> Result<Vec<SystemSummary>, GatewayError> {
        let systems = self.registry.find_all().await?;
        Ok(systems
            .into_iter()
            .map(|config| SystemSummary {
                is_healthy: config.is_healthy(),
                success_rate: config.success_rate(),
                system_code: config.system_code,
                system_name: config.system_name,
                organization: config.organization,
                status: config.status,
                is_active: config.is_active,
                last_health_check: config.last_health_check,
            })
            .collect())
    }

    /// Resilience counters for one system; `None` before its first dispatch.
    /// `detailed` additionally surfaces the resolved retry policy.
    #[must_use]
    pub fn metrics(&self, system_code: &str, detailed: bool) -> Option<HealthSnapshot> {
        let policy = detailed.then(|| self.policies.resolve(system_code));
        self.health.snapshot(system_code, policy)
    }

    /// Drop cached responses for one system, or for all when `None`.
    pub async fn clear_cache(&self, system_code: Option<&str>) {
        self.cache.invalidate(system_code).await;
        tracing::info!(system = system_code.unwrap_or("ALL"), "cache cleared");
    }
}
