//! Agent status and command endpoints
//!
//! Global routes operate on the full registry; project-scoped routes parse
//! and validate the project id themselves so a malformed id yields a 400
//! instead of an unrouted 404, then gate on the token's project grants.

use crate::guards::{AgentsRateLimit, Authenticated, ProjectsRateLimit};
use crate::response::ApiError;
use crate::state::AppState;
use obsv_domain::agent::{AgentCommand, AgentControl};
use obsv_domain::error::Error;
use obsv_domain::project::ProjectId;
use obsv_infrastructure::auth::Claims;
use obsv_infrastructure::logging::audit;
use rocket::State;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    agents: Vec<AgentControl>,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    agent_id: String,
    command: String,
    #[allow(dead_code)]
    parameters: Option<serde_json::Value>,
    source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    success: bool,
    agent_id: String,
    command: String,
    executed_at: String,
    output: String,
}

#[rocket::get("/api/agents/status")]
pub fn status(
    _rate: AgentsRateLimit,
    _auth: Authenticated,
    state: &State<AppState>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        agents: state.agents.snapshot(None),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[rocket::post("/api/agents/command", format = "json", data = "<body>")]
pub fn command(
    _rate: AgentsRateLimit,
    auth: Authenticated,
    body: Result<Json<CommandRequest>, rocket::serde::json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&auth.0, parse_body(body)?, state, None)
}

#[rocket::get("/api/projects/<project_id>/agents/status")]
pub fn project_status(
    project_id: &str,
    _rate: ProjectsRateLimit,
    auth: Authenticated,
    state: &State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let project = authorize_project(&auth.0, project_id)?;
    Ok(Json(StatusResponse {
        agents: state.agents.snapshot(Some(project.as_str())),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

#[rocket::post(
    "/api/projects/<project_id>/agents/command",
    format = "json",
    data = "<body>"
)]
pub fn project_command(
    project_id: &str,
    _rate: ProjectsRateLimit,
    auth: Authenticated,
    body: Result<Json<CommandRequest>, rocket::serde::json::Error<'_>>,
    state: &State<AppState>,
) -> Result<Json<CommandResponse>, ApiError> {
    let project = authorize_project(&auth.0, project_id)?;
    run_command(&auth.0, parse_body(body)?, state, Some(project.as_str()))
}

/// A body that fails to parse is a plain validation failure, not a 422
fn parse_body(
    body: Result<Json<CommandRequest>, rocket::serde::json::Error<'_>>,
) -> Result<CommandRequest, ApiError> {
    Ok(body
        .map_err(|_| Error::validation("Invalid request body"))?
        .into_inner())
}

/// Parse the path segment into a valid project id and check the caller's
/// grants. Validation failures (400) are checked before access (403) so a
/// garbage id never leaks whether such a project exists.
fn authorize_project(claims: &Claims, raw: &str) -> Result<ProjectId, ApiError> {
    let project: ProjectId = raw
        .parse()
        .map_err(|_| Error::validation_field("Invalid project id", "projectId"))?;
    if !claims.has_project_access(project.as_str()) {
        return Err(Error::authorization("No access to this project").into());
    }
    Ok(project)
}

fn run_command(
    claims: &Claims,
    request: CommandRequest,
    state: &State<AppState>,
    project: Option<&str>,
) -> Result<Json<CommandResponse>, ApiError> {
    if !claims.has_permission("write") {
        return Err(Error::authorization("Insufficient permissions").into());
    }
    if request.agent_id.trim().is_empty() {
        return Err(Error::validation_field("Agent id is required", "agentId").into());
    }

    let command = parse_command(&request.command)?;
    let source = request.source.as_deref().unwrap_or("dashboard");

    let output = state
        .agents
        .execute(&request.agent_id, command, source, project)?;

    audit(
        "agent command",
        &json!({
            "user": claims.sub,
            "agentId": request.agent_id,
            "command": command.as_str(),
            "project": project,
        }),
    );

    Ok(Json(CommandResponse {
        success: true,
        agent_id: request.agent_id,
        command: command.as_str().to_string(),
        executed_at: chrono::Utc::now().to_rfc3339(),
        output,
    }))
}

fn parse_command(raw: &str) -> Result<AgentCommand, ApiError> {
    match raw {
        "start" => Ok(AgentCommand::Start),
        "stop" => Ok(AgentCommand::Stop),
        "pause" => Ok(AgentCommand::Pause),
        "resume" => Ok(AgentCommand::Resume),
        _ => Err(Error::validation_field("Unknown command", "command").into()),
    }
}
