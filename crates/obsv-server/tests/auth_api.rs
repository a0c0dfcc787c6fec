//! Login/logout integration tests
//!
//! Drive the real Rocket instance through the local client: credential
//! checks, token delivery (body + HttpOnly cookie), generic failure
//! messages, and revocation on logout.

use obsv_infrastructure::config::AppConfig;
use obsv_server::{AppState, build_rocket};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;

const TEST_SECRET: &str = "integration-test-secret-32-chars!!";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

async fn test_client() -> Client {
    let state = AppState::from_config(&test_config()).expect("valid config");
    Client::tracked(build_rocket(state))
        .await
        .expect("valid rocket instance")
}

async fn login<'a>(
    client: &'a Client,
    username: &str,
    password: &str,
) -> rocket::local::asynchronous::LocalResponse<'a> {
    client
        .post("/api/auth/login")
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"username": "{username}", "password": "{password}"}}"#
        ))
        .dispatch()
        .await
}

#[rocket::async_test]
async fn test_login_success_returns_token_and_user() {
    let client = test_client().await;

    let response = login(&client, "admin", "admin123").await;
    assert_eq!(response.status(), Status::Ok);

    let set_cookie = response
        .headers()
        .get_one("Set-Cookie")
        .expect("Set-Cookie header");
    assert!(set_cookie.contains("auth-token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));

    let body = response.into_string().await.expect("response body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");

    assert!(json["token"].as_str().expect("token").contains('.'));
    assert_eq!(json["user"]["id"], "admin");
    assert_eq!(
        json["user"]["permissions"],
        serde_json::json!(["admin", "read", "write"])
    );
    assert!(json["user"]["projectIds"].is_array());
}

#[rocket::async_test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let client = test_client().await;

    let wrong_password = login(&client, "admin", "nope").await;
    assert_eq!(wrong_password.status(), Status::Unauthorized);
    let body_a = wrong_password.into_string().await.expect("body");

    let unknown_user = login(&client, "ghost", "nope").await;
    assert_eq!(unknown_user.status(), Status::Unauthorized);
    let body_b = unknown_user.into_string().await.expect("body");

    // Same generic message either way: no username enumeration.
    assert_eq!(body_a, body_b);
    let json: serde_json::Value = serde_json::from_str(&body_a).expect("valid JSON");
    assert_eq!(json["error"], "Invalid credentials");
}

#[rocket::async_test]
async fn test_empty_username_is_a_field_validation_error() {
    let client = test_client().await;

    let response = login(&client, "", "admin123").await;
    assert_eq!(response.status(), Status::BadRequest);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["details"]["field"], "username");
}

#[rocket::async_test]
async fn test_malformed_body_is_a_400() {
    let client = test_client().await;

    // Missing field and syntactically broken JSON are both plain
    // validation failures.
    for body in [r#"{"username": "admin"}"#, "{not json"] {
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(body)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_string().await.expect("body");
        let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
        assert_eq!(json["error"], "Invalid request body");
    }
}

#[rocket::async_test]
async fn test_bearer_token_authenticates_status_endpoint() {
    let client = test_client().await;

    let response = login(&client, "admin", "admin123").await;
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    let token = json["token"].as_str().expect("token").to_string();

    let response = client
        .get("/api/agents/status")
        .header(Header::new("Authorization", format!("Bearer {token}")))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[rocket::async_test]
async fn test_cookie_authenticates_status_endpoint() {
    let client = test_client().await;

    // The tracked client keeps the auth cookie from the login response.
    let response = login(&client, "admin", "admin123").await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/api/agents/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[rocket::async_test]
async fn test_logout_revokes_the_token() {
    let client = test_client().await;

    let response = login(&client, "admin", "admin123").await;
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    let token = json["token"].as_str().expect("token").to_string();
    let bearer = Header::new("Authorization", format!("Bearer {token}"));

    let response = client
        .get("/api/agents/status")
        .header(bearer.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post("/api/auth/logout")
        .header(bearer.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // The signature is still valid; revocation is what rejects it.
    let response = client
        .get("/api/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_health_is_public_with_optional_auth() {
    let client = test_client().await;

    let response = client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["authenticated"], false);

    // A valid token flips the optional-auth flag without being required.
    let login_response = login(&client, "admin", "admin123").await;
    let login_body = login_response.into_string().await.expect("body");
    let login_json: serde_json::Value = serde_json::from_str(&login_body).expect("valid JSON");
    let token = login_json["token"].as_str().expect("token");

    let response = client
        .get("/api/health")
        .header(Header::new("Authorization", format!("Bearer {token}")))
        .dispatch()
        .await;
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["authenticated"], true);
}
