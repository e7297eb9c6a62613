mod helpers;

use helpers::*;
use serde_json::json;

use tulay::{ErrorCode, GatewayError, TransportError};
use tulay_mock::{MockBehavior, MockTransport};

#[tokio::test]
async fn persistent_5xx_exhausts_exactly_the_retry_budget() {
    let t = build_gateway(
        vec![active_system("SSS", "https://sss.example")],
        MockTransport::always(MockBehavior::status(503)),
        |b| b.retry_policy("SSS", fast_policy(3)),
    )
    .await;

    let response = t
        .gateway
        .dispatch_with_retry("SSS", &post("SSS", "/claims"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.error_code, Some(ErrorCode::RetryExhausted));
    assert_eq!(t.transport.call_count().await, 3);

    let metrics = t.gateway.metrics("SSS", false).unwrap();
    assert_eq!(metrics.total_attempts, 3);
    assert_eq!(metrics.total_failures, 1);
    assert_eq!(metrics.total_successes, 0);
}

#[tokio::test]
async fn http_400_short_circuits_after_one_attempt() {
    let t = build_gateway(
        vec![active_system("BIR", "https://bir.example")],
        MockTransport::always(MockBehavior::Respond {
            status: 400,
            body: Some(json!({"error": "malformed TIN"})),
        }),
        |b| b.retry_policy("BIR", fast_policy(3)),
    )
    .await;

    let started = std::time::Instant::now();
    let response = t
        .gateway
        .dispatch_with_retry("BIR", &post("BIR", "/returns"))
        .await
        .unwrap();

    // One attempt, the partner's own failure code, and no backoff sleep.
    assert_eq!(t.transport.call_count().await, 1);
    assert_eq!(response.status_code, Some(400));
    assert_eq!(response.error_code, Some(ErrorCode::HttpError));
    assert!(started.elapsed().as_millis() < 200);

    let metrics = t.gateway.metrics("BIR", false).unwrap();
    assert_eq!(metrics.total_attempts, 1);
    assert_eq!(metrics.total_non_retryable_failures, 1);
    assert_eq!(metrics.total_failures, 0);
}

#[tokio::test]
async fn transient_failures_recover_on_a_later_attempt() {
    let t = build_gateway(
        vec![active_system("SSS", "https://sss.example")],
        MockTransport::new(),
        |b| b.retry_policy("SSS", fast_policy(3)),
    )
    .await;
    t.transport.push(MockBehavior::status(503)).await;
    t.transport
        .push(MockBehavior::ok(json!({"memberStatus": "active"})))
        .await;

    let response = t
        .gateway
        .dispatch_with_retry("SSS", &post("SSS", "/claims"))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(t.transport.call_count().await, 2);

    let metrics = t.gateway.metrics("SSS", false).unwrap();
    assert_eq!(metrics.total_attempts, 2);
    assert_eq!(metrics.total_successes, 1);
}

#[tokio::test]
async fn connection_failures_are_retried() {
    let t = build_gateway(
        vec![active_system("LRA", "https://lra.example")],
        MockTransport::new(),
        |b| b.retry_policy("LRA", fast_policy(2)),
    )
    .await;
    t.transport
        .push(MockBehavior::Fail(TransportError::Connect("refused".into())))
        .await;

    let response = t
        .gateway
        .dispatch_with_retry("LRA", &get("LRA", "/titles/1"))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(t.transport.call_count().await, 2);
}

#[tokio::test]
async fn stalled_attempts_time_out_and_count_as_retryable() {
    let t = build_gateway(
        vec![active_system("CDA", "https://cda.example")],
        MockTransport::always(MockBehavior::Hang),
        |b| {
            b.retry_policy(
                "CDA",
                tulay::RetryPolicy {
                    max_retries: 2,
                    base_delay_ms: 1,
                    max_delay_ms: 2,
                    backoff_multiplier: 2.0,
                    timeout_ms: 50,
                },
            )
        },
    )
    .await;

    let response = t
        .gateway
        .dispatch_with_retry("CDA", &get("CDA", "/coops"))
        .await
        .unwrap();

    assert_eq!(response.error_code, Some(ErrorCode::RetryExhausted));
    assert!(
        response
            .error_message
            .as_deref()
            .unwrap()
            .contains("timed out")
    );
    assert_eq!(t.gateway.metrics("CDA", false).unwrap().total_attempts, 2);
}

#[tokio::test]
async fn fatal_transport_failures_short_circuit() {
    let t = build_gateway(
        vec![active_system("DOLE", "https://dole.example")],
        MockTransport::always(MockBehavior::Fail(TransportError::Request(
            "invalid header value".into(),
        ))),
        |b| b.retry_policy("DOLE", fast_policy(3)),
    )
    .await;

    let response = t
        .gateway
        .dispatch_with_retry("DOLE", &get("DOLE", "/permits"))
        .await
        .unwrap();

    assert_eq!(response.error_code, Some(ErrorCode::NonRetryableError));
    assert_eq!(t.transport.call_count().await, 1);
    assert_eq!(
        t.gateway
            .metrics("DOLE", false)
            .unwrap()
            .total_non_retryable_failures,
        1
    );
}

#[tokio::test]
async fn gateway_side_rate_limiting_is_not_retried() {
    let mut config = active_system("SSS", "https://sss.example");
    config.rate_limit_per_minute = Some(1);
    let t = build_gateway(vec![config], MockTransport::new(), |b| {
        b.retry_policy("SSS", fast_policy(3))
    })
    .await;

    t.gateway
        .dispatch_with_retry("SSS", &post("SSS", "/claims"))
        .await
        .unwrap();
    let rejected = t
        .gateway
        .dispatch_with_retry("SSS", &post("SSS", "/claims"))
        .await
        .unwrap();

    assert_eq!(rejected.error_code, Some(ErrorCode::RateLimitExceeded));
    // First call dispatched once; the rejection consumed no further attempts.
    assert_eq!(t.transport.call_count().await, 1);
}

#[tokio::test]
async fn metrics_account_successes_and_exhaustions_exactly() {
    let t = build_gateway(
        vec![active_system("PAGIBIG", "https://pagibig.example")],
        MockTransport::new(),
        |b| b.retry_policy("PAGIBIG", fast_policy(2)),
    )
    .await;

    for _ in 0..3 {
        let ok = t
            .gateway
            .dispatch_with_retry("PAGIBIG", &post("PAGIBIG", "/loans"))
            .await
            .unwrap();
        assert!(ok.success);
    }
    // Two exhausted sequences of two attempts each.
    for _ in 0..4 {
        t.transport.push(MockBehavior::status(503)).await;
    }
    for _ in 0..2 {
        let nok = t
            .gateway
            .dispatch_with_retry("PAGIBIG", &post("PAGIBIG", "/loans"))
            .await
            .unwrap();
        assert_eq!(nok.error_code, Some(ErrorCode::RetryExhausted));
    }

    let metrics = t.gateway.metrics("PAGIBIG", false).unwrap();
    assert_eq!(metrics.total_attempts, 7);
    assert_eq!(metrics.total_successes, 3);
    assert_eq!(metrics.total_failures, 2);
    assert_eq!(metrics.total_non_retryable_failures, 0);
    assert_eq!(metrics.success_rate, 3.0 / 7.0);
}

#[tokio::test]
async fn detailed_metrics_surface_the_resolved_policy() {
    let t = build_gateway(
        vec![active_system("SSS", "https://sss.example")],
        MockTransport::new(),
        |b| b.retry_policy("SSS", fast_policy(4)),
    )
    .await;

    t.gateway
        .dispatch_with_retry("SSS", &post("SSS", "/claims"))
        .await
        .unwrap();

    let plain = t.gateway.metrics("SSS", false).unwrap();
    assert!(plain.retry_policy.is_none());

    let detailed = t.gateway.metrics("SSS", true).unwrap();
    assert_eq!(detailed.retry_policy, Some(fast_policy(4)));
}

#[tokio::test]
async fn metrics_are_empty_until_first_dispatch() {
    let t = gateway_with(vec![active_system("SSS", "https://sss.example")]).await;
    assert!(t.gateway.metrics("SSS", true).is_none());
}

#[tokio::test]
async fn empty_system_code_is_rejected() {
    let t = gateway_with(vec![]).await;
    let err = t
        .gateway
        .dispatch_with_retry("", &post("SSS", "/claims"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArg(_)));
}
