//! Server transport port and its reqwest implementation

use async_trait::async_trait;
use obsv_domain::agent::AgentControl;
use obsv_domain::error::{Error, Result};
use obsv_domain::project::ProjectId;
use serde::{Deserialize, Serialize};

/// Command request as sent to the command endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Target agent id
    pub agent_id: String,
    /// Wire name of the command ("start", "stop", "pause", "resume")
    pub command: String,
    /// Originator label recorded server-side
    pub source: String,
}

/// Server acknowledgement of an executed command
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    /// Whether the server applied the command
    pub success: bool,
    /// Echoed agent id
    pub agent_id: String,
    /// Echoed command name
    pub command: String,
    /// Server-side execution timestamp (RFC 3339)
    pub executed_at: String,
    /// Human-readable result line
    pub output: String,
}

/// How the manager reaches the status/command endpoints
///
/// `project` selects the project-scoped routes when present and the global
/// ones otherwise.
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Fetch the current agent collection for the given scope
    async fn fetch_status(&self, project: Option<&ProjectId>) -> Result<Vec<AgentControl>>;

    /// Submit a command for the given scope
    async fn send_command(
        &self,
        project: Option<&ProjectId>,
        request: &CommandRequest,
    ) -> Result<CommandAck>;
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    agents: Vec<AgentControl>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    #[serde(rename = "retryAfter")]
    retry_after: Option<u64>,
}

/// reqwest-backed transport against the control plane HTTP API
pub struct HttpStatusTransport {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpStatusTransport {
    /// Create a transport for `base_url` (no trailing slash) authenticating
    /// with a bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn endpoint(&self, project: Option<&ProjectId>, tail: &str) -> String {
        match project {
            Some(p) => format!("{}/api/projects/{}/agents/{tail}", self.base_url, p),
            None => format!("{}/api/agents/{tail}", self.base_url),
        }
    }
}

/// Map a non-success HTTP response onto the error taxonomy, preferring the
/// server's own error message when the body parses.
async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let payload: ErrorPayload = response.json().await.unwrap_or(ErrorPayload {
        error: None,
        retry_after: None,
    });
    let message = payload
        .error
        .unwrap_or_else(|| format!("Server returned {status}"));

    match status.as_u16() {
        400 => Error::validation(message),
        401 => Error::authentication(message),
        403 => Error::authorization(message),
        404 => Error::not_found(message),
        429 => Error::rate_limited(payload.retry_after.unwrap_or(1)),
        _ => Error::network(message),
    }
}

#[async_trait]
impl StatusTransport for HttpStatusTransport {
    async fn fetch_status(&self, project: Option<&ProjectId>) -> Result<Vec<AgentControl>> {
        let response = self
            .http
            .get(self.endpoint(project, "status"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::network(format!("Status request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload: StatusPayload = response
            .json()
            .await
            .map_err(|e| Error::network(format!("Malformed status payload: {e}")))?;
        Ok(payload.agents)
    }

    async fn send_command(
        &self,
        project: Option<&ProjectId>,
        request: &CommandRequest,
    ) -> Result<CommandAck> {
        let response = self
            .http
            .post(self.endpoint(project, "command"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::network(format!("Command request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::network(format!("Malformed command payload: {e}")))
    }
}
