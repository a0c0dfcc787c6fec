//! Server-side agent registry
//!
//! The authoritative agent collection behind the status and command
//! endpoints. Commands are validated against the same transition rules the
//! client manager applies locally, so an out-of-date client gets a clean
//! 400 instead of a corrupted agent state.

use obsv_domain::agent::{
    AgentCommand, AgentControl, AgentKind, AgentStatus, CommandOutcome, CommandRecord,
};
use obsv_domain::error::{Error, Result};
use obsv_infrastructure::time::now_unix_millis;
use std::sync::RwLock;
use tracing::warn;

struct AgentEntry {
    agent: AgentControl,
    project: Option<String>,
}

/// In-memory agent collection, seeded at boot
pub struct AgentRegistry {
    entries: RwLock<Vec<AgentEntry>>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Registry seeded with the default development agents
    pub fn seeded() -> Self {
        let registry = Self::new();
        registry.register(
            AgentControl::new(
                "agent-coder-1".into(),
                "Coder One".into(),
                AgentKind::Coder,
                true,
            ),
            Some("happy-devkit".to_string()),
        );
        registry.register(
            AgentControl::new(
                "agent-tester-1".into(),
                "Tester One".into(),
                AgentKind::Tester,
                false,
            ),
            Some("happy-devkit".to_string()),
        );
        registry.register(
            AgentControl::new(
                "agent-reviewer-1".into(),
                "Reviewer One".into(),
                AgentKind::Reviewer,
                true,
            ),
            None,
        );
        registry
    }

    /// Add an agent, optionally bound to a project
    pub fn register(&self, agent: AgentControl, project: Option<String>) {
        let Ok(mut entries) = self.entries.write() else {
            warn!("Agent registry lock poisoned, cannot register agent");
            return;
        };
        entries.push(AgentEntry { agent, project });
    }

    /// Current agents, filtered to a project when a scope is given
    pub fn snapshot(&self, project: Option<&str>) -> Vec<AgentControl> {
        let Ok(entries) = self.entries.read() else {
            warn!("Agent registry lock poisoned, returning empty snapshot");
            return Vec::new();
        };
        entries
            .iter()
            .filter(|e| match project {
                Some(p) => e.project.as_deref() == Some(p),
                None => true,
            })
            .map(|e| e.agent.clone())
            .collect()
    }

    /// Validate and apply a command, returning a human-readable output line
    pub fn execute(
        &self,
        agent_id: &str,
        command: AgentCommand,
        source: &str,
        project: Option<&str>,
    ) -> Result<String> {
        let Ok(mut entries) = self.entries.write() else {
            return Err(Error::internal("Agent registry lock poisoned"));
        };

        let entry = entries
            .iter_mut()
            .find(|e| {
                e.agent.id == agent_id
                    && match project {
                        Some(p) => e.project.as_deref() == Some(p),
                        None => true,
                    }
            })
            .ok_or_else(|| Error::validation("Agent not found"))?;

        let agent = &mut entry.agent;
        validate_transition(agent, command)?;

        agent.set_status(command.target_status());
        agent.last_command = Some(CommandRecord {
            command,
            timestamp: now_unix_millis(),
            source: source.to_string(),
            result: CommandOutcome::Success,
        });

        Ok(format!(
            "Agent {} {} at {}",
            agent.name,
            past_tense(command),
            chrono::Utc::now().to_rfc3339()
        ))
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

/// The transition rules shared with the client-side manager
fn validate_transition(agent: &AgentControl, command: AgentCommand) -> Result<()> {
    match command {
        AgentCommand::Start if !agent.can_start => {
            Err(Error::validation("Agent is already running"))
        }
        AgentCommand::Stop if !agent.can_stop => Err(Error::validation("Agent is not running")),
        AgentCommand::Pause if !agent.can_pause => {
            Err(Error::validation("Agent does not support pausing"))
        }
        AgentCommand::Pause if agent.status != AgentStatus::Running => {
            Err(Error::validation("Agent must be running to pause"))
        }
        AgentCommand::Resume if agent.status != AgentStatus::Paused => {
            Err(Error::validation("Agent is not paused"))
        }
        _ => Ok(()),
    }
}

fn past_tense(command: AgentCommand) -> &'static str {
    match command {
        AgentCommand::Start => "started",
        AgentCommand::Stop => "stopped",
        AgentCommand::Pause => "paused",
        AgentCommand::Resume => "resumed",
    }
}
