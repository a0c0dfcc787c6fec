//! Agent status/command integration tests
//!
//! Covers the global and project-scoped routes: auth gating, permission
//! checks, transition validation, and project-id validation order.

use obsv_infrastructure::auth::password::hash_password;
use obsv_infrastructure::config::AppConfig;
use obsv_server::state::UserRecord;
use obsv_server::{AppState, build_rocket};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;

const TEST_SECRET: &str = "integration-test-secret-32-chars!!";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

/// Client with the seeded admin plus a write-capable user scoped to
/// `happy-devkit` and a read-only viewer.
async fn test_client() -> Client {
    let mut state = AppState::from_config(&test_config()).expect("valid config");
    state.users.insert(
        "operator",
        UserRecord {
            id: "operator".to_string(),
            password_hash: hash_password("operator-pass-1!").expect("hash"),
            permissions: vec!["read".to_string(), "write".to_string()],
            project_ids: vec!["happy-devkit".to_string()],
        },
    );
    state.users.insert(
        "viewer",
        UserRecord {
            id: "viewer".to_string(),
            password_hash: hash_password("viewer-pass-1!").expect("hash"),
            permissions: vec!["read".to_string()],
            project_ids: vec!["happy-devkit".to_string()],
        },
    );
    Client::tracked(build_rocket(state))
        .await
        .expect("valid rocket instance")
}

async fn bearer_for(client: &Client, username: &str, password: &str) -> Header<'static> {
    let response = client
        .post("/api/auth/login")
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"username": "{username}", "password": "{password}"}}"#
        ))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login for {username}");
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    let token = json["token"].as_str().expect("token");
    Header::new("Authorization", format!("Bearer {token}"))
}

fn command_body(agent_id: &str, command: &str) -> String {
    format!(r#"{{"agentId": "{agent_id}", "command": "{command}", "source": "test"}}"#)
}

#[rocket::async_test]
async fn test_status_requires_authentication() {
    let client = test_client().await;

    let response = client.get("/api/agents/status").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "Authentication required");
}

#[rocket::async_test]
async fn test_status_lists_seeded_agents() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "admin", "admin123").await;

    let response = client
        .get("/api/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");

    let agents = json["agents"].as_array().expect("agents array");
    assert_eq!(agents.len(), 3);
    assert!(json["timestamp"].is_string());

    let coder = agents
        .iter()
        .find(|a| a["id"] == "agent-coder-1")
        .expect("coder present");
    assert_eq!(coder["type"], "coder");
    assert_eq!(coder["status"], "idle");
    assert_eq!(coder["canStart"], true);
    assert_eq!(coder["canStop"], false);
}

#[rocket::async_test]
async fn test_command_start_updates_status() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "admin", "admin123").await;

    let response = client
        .post("/api/agents/command")
        .header(ContentType::JSON)
        .header(bearer.clone())
        .body(command_body("agent-coder-1", "start"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["success"], true);
    assert_eq!(json["agentId"], "agent-coder-1");
    assert_eq!(json["command"], "start");
    assert!(json["output"].as_str().expect("output").contains("started"));

    let response = client
        .get("/api/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    let coder = json["agents"]
        .as_array()
        .expect("agents")
        .iter()
        .find(|a| a["id"] == "agent-coder-1")
        .expect("coder")
        .clone();
    assert_eq!(coder["status"], "running");
    assert_eq!(coder["lastCommand"]["type"], "start");
    assert_eq!(coder["lastCommand"]["result"], "success");
}

#[rocket::async_test]
async fn test_invalid_transition_is_a_400() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "admin", "admin123").await;

    // Stop while idle.
    let response = client
        .post("/api/agents/command")
        .header(ContentType::JSON)
        .header(bearer)
        .body(command_body("agent-coder-1", "stop"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "Agent is not running");
}

#[rocket::async_test]
async fn test_unknown_command_and_unknown_agent() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "admin", "admin123").await;

    let response = client
        .post("/api/agents/command")
        .header(ContentType::JSON)
        .header(bearer.clone())
        .body(command_body("agent-coder-1", "explode"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["details"]["field"], "command");

    let response = client
        .post("/api/agents/command")
        .header(ContentType::JSON)
        .header(bearer)
        .body(command_body("agent-nope", "start"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "Agent not found");
}

#[rocket::async_test]
async fn test_malformed_command_body_is_a_400() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "admin", "admin123").await;

    let response = client
        .post("/api/agents/command")
        .header(ContentType::JSON)
        .header(bearer)
        .body(r#"{"command": "start"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "Invalid request body");
}

#[rocket::async_test]
async fn test_command_requires_write_permission() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "viewer", "viewer-pass-1!").await;

    let response = client
        .post("/api/agents/command")
        .header(ContentType::JSON)
        .header(bearer)
        .body(command_body("agent-coder-1", "start"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_project_status_filters_to_scope() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "operator", "operator-pass-1!").await;

    let response = client
        .get("/api/projects/happy-devkit/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    let agents = json["agents"].as_array().expect("agents");
    assert_eq!(agents.len(), 2);
    assert!(agents.iter().all(|a| a["id"] != "agent-reviewer-1"));
}

#[rocket::async_test]
async fn test_malformed_project_id_is_a_400_before_access_checks() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "operator", "operator-pass-1!").await;

    // Leading hyphen fails slug validation; the caller has no grant for it
    // either, but validation must win.
    let response = client
        .get("/api/projects/-bad-slug/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["details"]["field"], "projectId");
}

#[rocket::async_test]
async fn test_project_access_denied_without_grant() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "operator", "operator-pass-1!").await;

    let response = client
        .get("/api/projects/other-project/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let body = response.into_string().await.expect("body");
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "No access to this project");
}

#[rocket::async_test]
async fn test_admin_permission_bypasses_project_grants() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "admin", "admin123").await;

    // Admin has no explicit project grants at all.
    let response = client
        .get("/api/projects/other-project/agents/status")
        .header(bearer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[rocket::async_test]
async fn test_project_scoped_command() {
    let client = test_client().await;
    let bearer = bearer_for(&client, "operator", "operator-pass-1!").await;

    let response = client
        .post("/api/projects/happy-devkit/agents/command")
        .header(ContentType::JSON)
        .header(bearer.clone())
        .body(command_body("agent-coder-1", "start"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // The unscoped reviewer is not reachable through this project.
    let response = client
        .post("/api/projects/happy-devkit/agents/command")
        .header(ContentType::JSON)
        .header(bearer)
        .body(command_body("agent-reviewer-1", "start"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}
