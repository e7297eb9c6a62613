//! Persistence seam for registered external systems.

use async_trait::async_trait;
use chrono::Utc;

use tulay_types::{SystemConfig, SystemStatus};

use crate::error::GatewayError;

/// Key-value store of [`SystemConfig`] rows, keyed by system code.
///
/// The gateway re-reads configuration on every dispatch so administrative
/// changes (deactivation, credential rotation) take effect on the next call;
/// implementations must not cache rows on the gateway's behalf. Schema and
/// migrations are the implementer's concern.
#[async_trait]
pub trait SystemRegistry: Send + Sync {
    /// Look up one system by code.
    async fn find_by_system_code(
        &self,
        system_code: &str,
    ) -> Result<Option<SystemConfig>, GatewayError>;

    /// Persist a (possibly mutated) configuration row.
    async fn save(&self, config: SystemConfig) -> Result<(), GatewayError>;

    /// All registered systems.
    async fn find_all(&self) -> Result<Vec<SystemConfig>, GatewayError>;

    /// Fold one call outcome into the stored statistics.
    ///
    /// Success restores `Active` status; failure moves the row to `Error`.
    /// Unknown system codes are ignored (the row may have been deleted
    /// between dispatch and recording).
    async fn record_outcome(
        &self,
        system_code: &str,
        success: bool,
        response_time_ms: u64,
    ) -> Result<(), GatewayError> {
        let Some(mut config) = self.find_by_system_code(system_code).await? else {
            return Ok(());
        };
        if success {
            config.record_successful_call(response_time_ms);
            config.status = SystemStatus::Active;
        } else {
            config.record_failed_call();
            config.status = SystemStatus::Error;
        }
        self.save(config).await
    }

    /// Stamp a health-check result onto the stored row.
    async fn record_health_check(
        &self,
        system_code: &str,
        healthy: bool,
    ) -> Result<(), GatewayError> {
        let Some(mut config) = self.find_by_system_code(system_code).await? else {
            return Ok(());
        };
        config.last_health_check = Some(Utc::now());
        config.status = if healthy {
            SystemStatus::Active
        } else {
            SystemStatus::Error
        };
        self.save(config).await
    }
}
