//! integration tests for per-class rate limiting

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use givestream_db::Store;
use givestream_types::PledgeQuery;

use common::{TestApp, body_json, test_config};

/// config with the submission class throttled hard and the rest open.
fn throttled_config() -> givestream_types::Config {
    let mut config = test_config();
    // 12/min resolves to a burst of 5 with one slot back every 5s
    config.rate_limits.submission_per_minute = 12;
    config
}

#[tokio::test]
async fn test_submission_class_trips_after_burst() {
    let app = TestApp::with_config(throttled_config()).await;

    let mut created = 0u64;
    let mut limited = 0u64;
    for _ in 0..20 {
        let response = app
            .post_json(
                "/api/pledges",
                &json!({"phoneNumber": "+1234567890", "amount": 50}),
            )
            .await;
        match response.status() {
            StatusCode::CREATED => created += 1,
            StatusCode::TOO_MANY_REQUESTS => limited += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created + limited, 20);
    assert!(created >= 5, "burst should admit at least 5, got {created}");
    assert!(limited >= 1, "limiter should trip, got {limited} rejections");

    // every accepted request actually landed in the store
    let (_, total) = app.db.list_pledges(&PledgeQuery::default()).await.unwrap();
    assert_eq!(total, created);
}

#[tokio::test]
async fn test_rejection_envelope_and_retry_after() {
    let app = TestApp::with_config(throttled_config()).await;

    let mut rejection = None;
    for _ in 0..10 {
        let response = app
            .post_json(
                "/api/pledges",
                &json!({"phoneNumber": "+1234567890", "amount": 50}),
            )
            .await;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            rejection = Some(response);
            break;
        }
    }
    let rejection = rejection.expect("limiter should have tripped within 10 requests");

    assert!(
        rejection.headers().get("retry-after").is_some(),
        "429 should carry a retry-after header"
    );

    let body = body_json(rejection).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "too many pledge submissions, try again later");
}

#[tokio::test]
async fn test_rejections_reach_security_log() {
    let app = TestApp::with_config(throttled_config()).await;

    for _ in 0..20 {
        app.post_json(
            "/api/pledges",
            &json!({"phoneNumber": "+1234567890", "amount": 50}),
        )
        .await;
    }

    // log writes are fire-and-forget; give them a moment to land
    tokio::time::sleep(Duration::from_millis(300)).await;

    // each accepted request logs a submission event, each rejected one a
    // rate limit event
    let entries = app.db.count_security_logs().await.unwrap();
    assert_eq!(entries, 20);
}

#[tokio::test]
async fn test_classes_are_throttled_independently() {
    let app = TestApp::with_config(throttled_config()).await;

    // exhaust the submission class
    for _ in 0..10 {
        app.post_json(
            "/api/pledges",
            &json!({"phoneNumber": "+1234567890", "amount": 50}),
        )
        .await;
    }

    // the read and auth classes still respond normally
    let feed = app.get("/api/pledges/public").await;
    assert_eq!(feed.status(), StatusCode::OK);

    let login = app
        .post_json(
            "/api/auth/login",
            &json!({"email": "nobody@example.org", "password": "wrong"}),
        )
        .await;
    // processed (and refused on credentials), not throttled
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}
