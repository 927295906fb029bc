// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router tests: API key enforcement, error envelopes and response shapes.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod common;
use common::{api, TestApp, API_KEY};

fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = api_key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ─── Public Routes ───────────────────────────────────────────

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::start().await;

    for uri in ["/", "/health"] {
        let response = app.router().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "WHOOP Gateway");
    }
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::start().await;

    let response = app.router().oneshot(get("/health", None)).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn test_auth_status_without_credential() {
    let app = TestApp::start().await;

    let response = app.router().oneshot(get("/auth/status", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["authorized"], false);
    assert_eq!(body["message"], "Not authorized. Please visit /auth/start");
    assert!(body.get("expires_at").is_none());
}

// ─── API Key ─────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_api_key_rejected() {
    let app = TestApp::start().await;

    let response = app
        .router()
        .oneshot(get("/whoop/sleep/latest", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_wrong_api_key_rejected() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    let response = app
        .router()
        .oneshot(get("/whoop/profile", Some("not_the_key")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let app = TestApp::start().await;

    let request = Request::builder()
        .uri("/whoop/profile")
        .header(header::AUTHORIZATION, API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ─── Error Envelopes ─────────────────────────────────────────

#[tokio::test]
async fn test_valid_key_without_credential_requires_auth() {
    let app = TestApp::start().await;

    let response = app
        .router()
        .oneshot(get("/whoop/summary/today", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["error"], "AUTH_REQUIRED");
    assert_eq!(body["message"], "Please authorize at /auth/start");
}

#[tokio::test]
async fn test_empty_collection_is_no_data() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/activity/sleep")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/sleep/latest", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["error"], "NO_DATA");
    assert_eq!(body["message"], "No sleep data found");
}

#[tokio::test]
async fn test_upstream_failure_is_api_error() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/user/measurement/body")))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Upstream exploded" })),
        )
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/body", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "API_ERROR");
    assert_eq!(body["message"], "Upstream exploded");
}

// ─── Data Routes ─────────────────────────────────────────────

#[tokio::test]
async fn test_history_envelope_and_limit_cap() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/cycle")))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                { "id": 2, "start": "2026-01-15T04:00:00.000Z", "score": { "strain": 8.1 } },
                { "id": 1, "start": "2026-01-14T04:00:00.000Z", "score": { "strain": 11.4 } }
            ],
            "next_token": "MTIzOjEyMzEyMw"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/cycle/history?limit=100", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["records"][0]["id"], 2);
    assert_eq!(body["records"][1]["score"]["strain"], 11.4);
}

#[tokio::test]
async fn test_workout_history_default_limit() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/activity/workout")))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{ "id": "w1", "sport_name": "running" }]
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/workout/history", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["records"][0]["sport_name"], "running");
}

#[tokio::test]
async fn test_latest_sleep_keeps_unknown_fields() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/activity/sleep")))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "id": "s1",
                "start": "2026-01-14T22:00:00.000Z",
                "nap": false,
                "score": {
                    "sleep_performance_percentage": 88.0,
                    "respiratory_rate": 15.2
                }
            }]
        })))
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/sleep/latest", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["id"], "s1");
    assert_eq!(body["nap"], false);
    assert_eq!(body["score"]["respiratory_rate"], 15.2);
}

#[tokio::test]
async fn test_summary_today_shape() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/activity/sleep")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/cycle")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/summary/today", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["sleep"].is_null());
    assert!(body["recovery"].is_null());
    assert_eq!(body["flags"], json!([]));
    assert_eq!(
        body["training_hint"],
        json!({ "intensity": "unknown", "focus": "rest" })
    );
    assert_eq!(body["date"].as_str().unwrap().len(), 10);
}

#[tokio::test]
async fn test_malformed_limit_uses_default() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/activity/sleep")))
        .and(query_param("limit", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(1)
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/sleep/history?limit=abc", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["records"], json!([]));
}

#[tokio::test]
async fn test_integer_scores_pass_through_unchanged() {
    let app = TestApp::start().await;
    app.seed_valid("A0", "R0");

    Mock::given(method("GET"))
        .and(path(api("/cycle")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{ "id": 42, "start": "2026-01-15T04:00:00.000Z" }]
        })))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/cycle/42/recovery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cycle_id": 42,
            "score": { "recovery_score": 44, "resting_heart_rate": 64 }
        })))
        .mount(&app.server)
        .await;

    let response = app
        .router()
        .oneshot(get("/whoop/recovery/latest", Some(API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["score"]["recovery_score"].as_u64(), Some(44));
    assert_eq!(body["score"]["resting_heart_rate"].as_u64(), Some(64));
}
