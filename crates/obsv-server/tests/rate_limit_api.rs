//! Rate limiting integration tests
//!
//! A tightened auth quota drives the full blocking path: 429 status,
//! JSON body, Retry-After, and the quota headers on allowed responses.

use obsv_infrastructure::config::AppConfig;
use obsv_server::{AppState, build_rocket};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;

const TEST_SECRET: &str = "integration-test-secret-32-chars!!";

/// Client whose auth class allows only two requests per window
async fn tight_auth_client() -> Client {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.rate_limit.auth.max_requests = 2;
    config.rate_limit.auth.window_secs = 900;

    let state = AppState::from_config(&config).expect("valid config");
    Client::tracked(build_rocket(state))
        .await
        .expect("valid rocket instance")
}

async fn attempt_login(client: &Client) -> rocket::local::asynchronous::LocalResponse<'_> {
    client
        .post("/api/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"username": "admin", "password": "wrong"}"#)
        .dispatch()
        .await
}

#[rocket::async_test]
async fn test_third_auth_request_is_blocked() {
    let client = tight_auth_client().await;

    assert_eq!(attempt_login(&client).await.status(), Status::Unauthorized);
    assert_eq!(attempt_login(&client).await.status(), Status::Unauthorized);

    let blocked = attempt_login(&client).await;
    assert_eq!(blocked.status(), Status::TooManyRequests);

    let retry_after = blocked
        .headers()
        .get_one("Retry-After")
        .expect("Retry-After header")
        .parse::<u64>()
        .expect("integer Retry-After");
    assert!(retry_after >= 1);

    let body = blocked.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "Too many requests");
    assert!(json["retryAfter"].is_u64());
}

#[rocket::async_test]
async fn test_quota_headers_on_allowed_responses() {
    let client = tight_auth_client().await;

    let response = attempt_login(&client).await;
    assert_eq!(
        response.headers().get_one("X-RateLimit-Limit"),
        Some("2")
    );
    assert_eq!(
        response.headers().get_one("X-RateLimit-Remaining"),
        Some("1")
    );
    // Reset is an RFC 3339 timestamp.
    let reset = response
        .headers()
        .get_one("X-RateLimit-Reset")
        .expect("X-RateLimit-Reset header");
    assert!(chrono::DateTime::parse_from_rfc3339(reset).is_ok());

    let response = attempt_login(&client).await;
    assert_eq!(
        response.headers().get_one("X-RateLimit-Remaining"),
        Some("0")
    );
}

#[rocket::async_test]
async fn test_other_classes_unaffected_by_auth_exhaustion() {
    let client = tight_auth_client().await;

    attempt_login(&client).await;
    attempt_login(&client).await;
    assert_eq!(attempt_login(&client).await.status(), Status::TooManyRequests);

    // The agents class still answers; it fails on auth, not on quota.
    let response = client.get("/api/agents/status").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_health_is_never_rate_limited() {
    let client = tight_auth_client().await;

    for _ in 0..10 {
        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert!(response.headers().get_one("X-RateLimit-Limit").is_none());
    }
}
