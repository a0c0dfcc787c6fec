//! Agent control model
//!
//! The shared view of a development agent as exposed by the status endpoint
//! and cached by the client-side control manager. Wire fields are camelCase
//! to match the dashboard API.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Agent is registered but not doing work
    Idle,
    /// Agent is actively working
    Running,
    /// Agent is paused and can be resumed
    Paused,
    /// Agent terminated with an error
    Failed,
    /// Agent finished its work
    Completed,
}

/// Kind of development agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    /// General-purpose coding agent
    Coder,
    /// Test authoring and execution agent
    Tester,
    /// Code review agent
    Reviewer,
    /// Deployment/release agent
    Deployer,
    /// Documentation agent
    Documenter,
}

/// Control command that can be issued against an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCommand {
    /// Begin work (idle -> running)
    Start,
    /// Halt work (running/paused -> idle)
    Stop,
    /// Suspend work (running -> paused)
    Pause,
    /// Continue suspended work (paused -> running)
    Resume,
}

impl AgentCommand {
    /// Status an agent optimistically transitions to when this command succeeds
    pub fn target_status(self) -> AgentStatus {
        match self {
            Self::Start | Self::Resume => AgentStatus::Running,
            Self::Stop => AgentStatus::Idle,
            Self::Pause => AgentStatus::Paused,
        }
    }

    /// Wire name of the command
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }
}

/// Result of the most recent command issued against an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    /// Command was accepted by the server
    Success,
    /// Command was rejected or the transport failed
    Failed,
}

/// Record of the last command issued against an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    /// Command that was issued
    #[serde(rename = "type")]
    pub command: AgentCommand,
    /// When the command was issued (epoch milliseconds)
    pub timestamp: u64,
    /// Originator of the command (e.g. "dashboard", "cli")
    pub source: String,
    /// Outcome of the command
    pub result: CommandOutcome,
}

/// Controllable view of a single agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentControl {
    /// Unique agent identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Kind of agent
    #[serde(rename = "type")]
    pub kind: AgentKind,
    /// Current lifecycle state
    pub status: AgentStatus,
    /// Whether a start command is currently accepted
    pub can_start: bool,
    /// Whether a stop command is currently accepted
    pub can_stop: bool,
    /// Whether this agent supports pausing at all
    pub can_pause: bool,
    /// The most recent command issued, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_command: Option<CommandRecord>,
}

impl AgentControl {
    /// Create an agent in the idle state with capability flags derived
    /// from the status. `supports_pause` is a property of the agent kind,
    /// not of its current state.
    pub fn new(id: String, name: String, kind: AgentKind, supports_pause: bool) -> Self {
        let mut agent = Self {
            id,
            name,
            kind,
            status: AgentStatus::Idle,
            can_start: true,
            can_stop: false,
            can_pause: supports_pause,
            last_command: None,
        };
        agent.refresh_capabilities();
        agent
    }

    /// Recompute `can_start` / `can_stop` from the current status.
    /// `can_pause` stays fixed: it advertises support, while the
    /// "must be running" rule is enforced at command time.
    pub fn refresh_capabilities(&mut self) {
        self.can_start = matches!(
            self.status,
            AgentStatus::Idle | AgentStatus::Failed | AgentStatus::Completed
        );
        self.can_stop = matches!(self.status, AgentStatus::Running | AgentStatus::Paused);
    }

    /// Apply a status change and refresh derived capability flags
    pub fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
        self.refresh_capabilities();
    }
}
