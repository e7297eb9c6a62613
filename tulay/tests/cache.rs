mod helpers;

use std::time::Duration;

use helpers::*;
use serde_json::json;

use tulay_mock::{MockBehavior, MockTransport};

#[tokio::test]
async fn repeated_get_is_served_from_cache() {
    let t = gateway_with(vec![active_system("PHILHEALTH", "https://ph.example")]).await;
    t.transport
        .set_default(MockBehavior::ok(json!({"coverage": "active"})))
        .await;

    let first = t.gateway.route(&get("PHILHEALTH", "/coverage/1")).await.unwrap();
    let second = t.gateway.route(&get("PHILHEALTH", "/coverage/1")).await.unwrap();

    assert_eq!(t.transport.call_count().await, 1);
    assert_eq!(first.body, second.body);
    assert!(second.success);
}

#[tokio::test]
async fn cache_expires_after_its_ttl() {
    let t = build_gateway(
        vec![active_system("PHILHEALTH", "https://ph.example")],
        MockTransport::new(),
        |b| b.cache_ttl(Duration::from_millis(50)),
    )
    .await;

    t.gateway.route(&get("PHILHEALTH", "/coverage/1")).await.unwrap();
    // Still inside the TTL: no new network call.
    t.gateway.route(&get("PHILHEALTH", "/coverage/1")).await.unwrap();
    assert_eq!(t.transport.call_count().await, 1);

    sleep_ms(80).await;
    t.gateway.route(&get("PHILHEALTH", "/coverage/1")).await.unwrap();
    assert_eq!(t.transport.call_count().await, 2);
}

#[tokio::test]
async fn only_get_requests_are_cached() {
    let t = gateway_with(vec![active_system("SSS", "https://sss.example")]).await;

    t.gateway.route(&post("SSS", "/claims")).await.unwrap();
    t.gateway.route(&post("SSS", "/claims")).await.unwrap();

    assert_eq!(t.transport.call_count().await, 2);
}

#[tokio::test]
async fn failed_responses_are_not_cached() {
    let t = gateway_with(vec![active_system("SSS", "https://sss.example")]).await;
    t.transport.set_default(MockBehavior::status(503)).await;

    t.gateway.route(&get("SSS", "/members")).await.unwrap();
    t.gateway.route(&get("SSS", "/members")).await.unwrap();

    assert_eq!(t.transport.call_count().await, 2);
}

#[tokio::test]
async fn distinct_endpoints_cache_independently() {
    let t = gateway_with(vec![active_system("SSS", "https://sss.example")]).await;

    t.gateway.route(&get("SSS", "/members/1")).await.unwrap();
    t.gateway.route(&get("SSS", "/members/2")).await.unwrap();

    assert_eq!(t.transport.call_count().await, 2);
}

#[tokio::test]
async fn clear_cache_for_one_system_leaves_others_cached() {
    let t = gateway_with(vec![
        active_system("SSS", "https://sss.example"),
        active_system("BIR", "https://bir.example"),
    ])
    .await;

    t.gateway.route(&get("SSS", "/members")).await.unwrap();
    t.gateway.route(&get("BIR", "/returns")).await.unwrap();

    t.gateway.clear_cache(Some("SSS")).await;

    t.gateway.route(&get("SSS", "/members")).await.unwrap();
    t.gateway.route(&get("BIR", "/returns")).await.unwrap();

    // SSS refetched, BIR still cached.
    assert_eq!(t.transport.call_count().await, 3);
}

#[tokio::test]
async fn clear_cache_without_a_code_clears_everything() {
    let t = gateway_with(vec![
        active_system("SSS", "https://sss.example"),
        active_system("BIR", "https://bir.example"),
    ])
    .await;

    t.gateway.route(&get("SSS", "/members")).await.unwrap();
    t.gateway.route(&get("BIR", "/returns")).await.unwrap();

    t.gateway.clear_cache(None).await;

    t.gateway.route(&get("SSS", "/members")).await.unwrap();
    t.gateway.route(&get("BIR", "/returns")).await.unwrap();

    assert_eq!(t.transport.call_count().await, 4);
}
