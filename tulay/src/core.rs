use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tulay_core::{GatewayError, HttpTransport, SystemRegistry};
use tulay_middleware::{RateLimiter, ResponseCache};
use tulay_types::RetryPolicy;

use crate::metrics::HealthTracker;
use crate::resilience::RetryPolicies;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_HEALTH_ENDPOINT: &str = "/health";

/// Gateway routing outbound requests to registered external systems.
pub struct Gateway {
    pub(crate) registry: Arc<dyn SystemRegistry>,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) rate_limiter: RateLimiter,
    pub(crate) cache: ResponseCache,
    pub(crate) health: HealthTracker,
    pub(crate) policies: RetryPolicies,
    pub(crate) health_endpoint: String,
}

impl Gateway {
    /// Start building a gateway.
    #[must_use]
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }
}

/// Builder for constructing a [`Gateway`].
pub struct GatewayBuilder {
    registry: Option<Arc<dyn SystemRegistry>>,
    transport: Option<Arc<dyn HttpTransport>>,
    cache_ttl: Duration,
    health_endpoint: String,
    retry_overrides: HashMap<String, RetryPolicy>,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayBuilder {
    /// Create a builder with defaults: 5-minute cache TTL, `/health` probe
    /// endpoint, built-in retry policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            transport: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            health_endpoint: DEFAULT_HEALTH_ENDPOINT.to_string(),
            retry_overrides: HashMap::new(),
        }
    }

    /// Set the system registry the gateway reads configuration from.
    ///
    /// Configuration is re-read on every dispatch, so administrative
    /// deactivation takes effect on the next call without a restart.
    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn SystemRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the transport outbound calls execute through.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the validity window for cached GET responses.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Override the partner-relative path probed by [`Gateway::health`].
    #[must_use]
    pub fn health_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.health_endpoint = endpoint.into();
        self
    }

    /// Pin the retry policy for one system code, replacing the built-in
    /// table for that code.
    ///
    /// The policy is resolved once per system code and cached for the
    /// process lifetime; high-value partners typically get more attempts
    /// and a longer per-attempt timeout.
    #[must_use]
    pub fn retry_policy(mut self, system_code: impl Into<String>, policy: RetryPolicy) -> Self {
        self.retry_overrides
            .insert(system_code.into().to_ascii_uppercase(), policy);
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no registry or no transport was supplied.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let registry = self
            .registry
            .ok_or_else(|| GatewayError::invalid_arg("a system registry is required"))?;
        let transport = self
            .transport
            .ok_or_else(|| GatewayError::invalid_arg("a transport is required"))?;
        Ok(Gateway {
            registry,
            transport,
            rate_limiter: RateLimiter::new(),
            cache: ResponseCache::new(self.cache_ttl),
            health: HealthTracker::new(),
            policies: RetryPolicies::new(self.retry_overrides),
            health_endpoint: self.health_endpoint,
        })
    }
}
