//! In-memory system registry double.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tulay_core::{GatewayError, SystemRegistry};
use tulay_types::{AuthScheme, SystemConfig, SystemStatus};

/// Build an `Active`, bearer-authenticated configuration the way most tests
/// need one.
#[must_use]
pub fn active_system(system_code: &str, base_url: &str) -> SystemConfig {
    let mut config = SystemConfig::new(system_code, system_code, base_url);
    config.status = SystemStatus::Active;
    config.auth_scheme = AuthScheme::Bearer;
    config.api_key = Some("test-api-key".to_string());
    config.client_id = Some("test-client-id".to_string());
    config.client_secret = Some("test-client-secret".to_string());
    config
}

/// [`SystemRegistry`] backed by a map, with save counting and a failure
/// switch for exercising the internal-error path.
#[derive(Default)]
pub struct MockRegistry {
    systems: Mutex<HashMap<String, SystemConfig>>,
    saves: AtomicUsize,
    fail_lookups: AtomicBool,
}

impl MockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a configuration row.
    pub async fn insert(&self, config: SystemConfig) {
        let mut guard = self.systems.lock().await;
        guard.insert(config.system_code.clone(), config);
    }

    /// Current stored row for a system, if any.
    pub async fn get(&self, system_code: &str) -> Option<SystemConfig> {
        self.systems.lock().await.get(system_code).cloned()
    }

    /// Number of `save` calls observed.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every lookup fail, simulating a broken backing store.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SystemRegistry for MockRegistry {
    async fn find_by_system_code(
        &self,
        system_code: &str,
    ) -> Result<Option<SystemConfig>, GatewayError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(GatewayError::registry("lookup failed"));
        }
        Ok(self.systems.lock().await.get(system_code).cloned())
    }

    async fn save(&self, config: SystemConfig) -> Result<(), GatewayError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.systems.lock().await;
        guard.insert(config.system_code.clone(), config);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<SystemConfig>, GatewayError> {
        let mut all: Vec<SystemConfig> = self.systems.lock().await.values().cloned().collect();
        all.sort_by(|a, b| a.system_code.cmp(&b.system_code));
        Ok(all)
    }
}
