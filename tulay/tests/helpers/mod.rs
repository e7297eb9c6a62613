//! Shared fixtures for gateway integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use tulay::{Gateway, GatewayBuilder, GatewayRequest, Method, RetryPolicy, SystemConfig};
use tulay_mock::{MockRegistry, MockTransport};

pub use tulay_mock::active_system;

/// A gateway wired to mocks, with handles kept for assertions.
pub struct TestGateway {
    pub gateway: Gateway,
    pub registry: Arc<MockRegistry>,
    pub transport: Arc<MockTransport>,
}

static TRACING: Once = Once::new();

/// Honor `RUST_LOG` when debugging a test run.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Build a gateway over the given systems, letting the caller adjust the
/// builder (TTL, retry policies) before it is finalized.
pub async fn build_gateway(
    systems: Vec<SystemConfig>,
    transport: MockTransport,
    configure: impl FnOnce(GatewayBuilder) -> GatewayBuilder,
) -> TestGateway {
    init_tracing();
    let registry = Arc::new(MockRegistry::new());
    for system in systems {
        registry.insert(system).await;
    }
    let transport = Arc::new(transport);

    let builder = Gateway::builder()
        .registry(registry.clone())
        .transport(transport.clone());
    let gateway = configure(builder).build().expect("gateway builds");

    TestGateway {
        gateway,
        registry,
        transport,
    }
}

/// Gateway over the given systems with default settings.
pub async fn gateway_with(systems: Vec<SystemConfig>) -> TestGateway {
    build_gateway(systems, MockTransport::new(), |b| b).await
}

/// Retry policy with millisecond delays so retry tests finish quickly.
pub fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 2.0,
        timeout_ms: 250,
    }
}

pub fn get(system_code: &str, endpoint: &str) -> GatewayRequest {
    GatewayRequest::new(system_code, Method::Get, endpoint)
}

pub fn post(system_code: &str, endpoint: &str) -> GatewayRequest {
    GatewayRequest::new(system_code, Method::Post, endpoint)
}

/// Short real-time sleep for TTL expiry tests.
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
