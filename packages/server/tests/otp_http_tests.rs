//! Integration tests for the OTP HTTP surface.
//!
//! Covers the full request path:
//! - Sending a code (success, missing phone, delivery failure)
//! - Verifying a code (success, single use, wrong code, expiry, re-issue)
//! - Status codes and JSON bodies

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestHarness;
use serde_json::json;
use server_core::domains::auth::OtpSettings;
use test_context::test_context;

const PHONE: &str = "+15551234567";

fn wrong_code_for(code: &str) -> &'static str {
    if code == "000000" {
        "111111"
    } else {
        "000000"
    }
}

// ============================================================================
// Send SMS
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn send_sms_returns_success_and_texts_code(ctx: &TestHarness) {
    let (status, body) = ctx.send_sms(PHONE).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let sent = ctx.notifier.sent_to(PHONE);
    assert_eq!(sent.len(), 1, "Exactly one SMS per issue");
    assert_eq!(ctx.last_code(PHONE).len(), 6);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn send_sms_without_phone_is_bad_request(ctx: &TestHarness) {
    let (status, body) = ctx.post_json("/send-sms", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = ctx.send_sms("   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.post_raw("/send-sms", "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(ctx.notifier.sent().is_empty(), "No SMS for invalid requests");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn send_sms_delivery_failure_is_server_error(ctx: &TestHarness) {
    ctx.notifier.set_failing(true);

    let (status, body) = ctx.send_sms(PHONE).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to send SMS");

    // Rolled back: the undelivered code cannot be used
    let code = ctx.last_code(PHONE);
    let (status, _) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Retrying the issue once delivery recovers works normally
    ctx.notifier.set_failing(false);
    let (status, _) = ctx.send_sms(PHONE).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.verify_code(PHONE, &ctx.last_code(PHONE)).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Verify code
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_never_issued_is_not_found(ctx: &TestHarness) {
    let (status, body) = ctx.verify_code(PHONE, "123456").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_correct_code_succeeds_once(ctx: &TestHarness) {
    ctx.send_sms(PHONE).await;
    let code = ctx.last_code(PHONE);

    let (status, body) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_wrong_code_keeps_challenge(ctx: &TestHarness) {
    ctx.send_sms(PHONE).await;
    let code = ctx.last_code(PHONE);

    let (status, _) = ctx.verify_code(PHONE, wrong_code_for(&code)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::OK);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_missing_fields_is_bad_request(ctx: &TestHarness) {
    ctx.send_sms(PHONE).await;

    let (status, _) = ctx
        .post_json("/verify-code", json!({ "phone_number": PHONE }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.post_json("/verify-code", json!({ "code": "123456" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Challenge untouched by malformed requests
    let (status, _) = ctx.verify_code(PHONE, &ctx.last_code(PHONE)).await;
    assert_eq!(status, StatusCode::OK);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verify_after_ttl_is_expired_then_not_found(ctx: &TestHarness) {
    ctx.send_sms(PHONE).await;
    let code = ctx.last_code(PHONE);

    ctx.clock.advance(Duration::minutes(5) + Duration::seconds(1));

    let (status, body) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("expired"));

    let (status, _) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reissue_invalidates_previous_code(ctx: &TestHarness) {
    ctx.send_sms(PHONE).await;
    let old_code = ctx.last_code(PHONE);

    let mut new_code = old_code.clone();
    while new_code == old_code {
        ctx.send_sms(PHONE).await;
        new_code = ctx.last_code(PHONE);
    }

    let (status, _) = ctx.verify_code(PHONE, &old_code).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.verify_code(PHONE, &new_code).await;
    assert_eq!(status, StatusCode::OK);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn codes_are_scoped_per_phone_number(ctx: &TestHarness) {
    let other = "+15559876543";
    ctx.send_sms(PHONE).await;
    ctx.send_sms(other).await;

    let (status, _) = ctx.verify_code(other, &ctx.last_code(other)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.verify_code(PHONE, &ctx.last_code(PHONE)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn lockout_returns_too_many_requests_when_configured() {
    let ctx = TestHarness::with_settings(OtpSettings {
        max_attempts: Some(2),
        ..OtpSettings::default()
    });

    ctx.send_sms(PHONE).await;
    let code = ctx.last_code(PHONE);
    let wrong = wrong_code_for(&code);

    let (status, _) = ctx.verify_code(PHONE, wrong).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = ctx.verify_code(PHONE, wrong).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = ctx.verify_code(PHONE, &code).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_verifies_succeed_exactly_once() {
    let ctx = std::sync::Arc::new(TestHarness::with_settings(OtpSettings::default()));
    ctx.send_sms(PHONE).await;
    let code = ctx.last_code(PHONE);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctx = ctx.clone();
            let code = code.clone();
            tokio::spawn(async move { ctx.verify_code(PHONE, &code).await.0 })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::NOT_FOUND)
            .count(),
        7
    );
}

// ============================================================================
// Health
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_pending_codes(ctx: &TestHarness) {
    let (status, body) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending_codes"], 0);

    ctx.send_sms(PHONE).await;
    let (_, body) = ctx.get("/health").await;
    assert_eq!(body["pending_codes"], 1);
}
