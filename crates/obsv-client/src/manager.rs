//! Agent control manager
//!
//! Keeps a cached agent collection in sync with the server and mediates
//! commands: local validation first, then the transport, then an optimistic
//! status transition. Subscribers get the full snapshot on every change.
//!
//! A command's optimistic update and a concurrently running resync may
//! interleave; the cache is last-write-wins with no version reconciliation,
//! and the next periodic sync converges it to the server's view.

use crate::transport::{CommandRequest, StatusTransport};
use obsv_domain::agent::{AgentCommand, AgentControl, AgentStatus, CommandOutcome, CommandRecord};
use obsv_domain::error::{Error, Result};
use obsv_domain::project::ProjectId;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Subscriber = Arc<dyn Fn(&[AgentControl]) + Send + Sync>;

/// Out-of-band partial status update for a single agent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    /// Target agent id
    pub agent_id: String,
    /// New lifecycle state, when the event carries one
    pub status: Option<AgentStatus>,
}

struct Inner {
    agents: Vec<AgentControl>,
    project: Option<ProjectId>,
    subscribers: HashMap<u64, Subscriber>,
    next_subscriber_id: u64,
    destroyed: bool,
}

/// Handle returned by [`AgentControlManager::subscribe`]
pub struct Subscription {
    inner: Arc<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    /// Remove the callback; it will not be invoked again
    pub fn unsubscribe(self) {
        let Ok(mut inner) = self.inner.lock() else {
            warn!("Agent manager lock poisoned, subscriber not removed");
            return;
        };
        inner.subscribers.remove(&self.id);
    }
}

/// Client-side cache of agent states with optimistic command execution
pub struct AgentControlManager {
    inner: Arc<Mutex<Inner>>,
    transport: Arc<dyn StatusTransport>,
    poll: Mutex<Option<JoinHandle<()>>>,
}

impl AgentControlManager {
    /// Create a manager with an empty cache and global (unscoped) polling
    pub fn new(transport: Arc<dyn StatusTransport>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                agents: Vec::new(),
                project: None,
                subscribers: HashMap::new(),
                next_subscriber_id: 0,
                destroyed: false,
            })),
            transport,
            poll: Mutex::new(None),
        }
    }

    /// Current cached agents
    pub fn snapshot(&self) -> Vec<AgentControl> {
        let Ok(inner) = self.inner.lock() else {
            warn!("Agent manager lock poisoned, returning empty snapshot");
            return Vec::new();
        };
        inner.agents.clone()
    }

    /// Register a snapshot callback
    ///
    /// The callback fires immediately with the current snapshot, then on
    /// every subsequent state change until unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[AgentControl]) + Send + Sync + 'static,
    {
        let callback: Subscriber = Arc::new(callback);
        let (id, snapshot) = {
            let Ok(mut inner) = self.inner.lock() else {
                warn!("Agent manager lock poisoned, subscription inert");
                return Subscription {
                    inner: Arc::clone(&self.inner),
                    id: u64::MAX,
                };
            };
            let id = inner.next_subscriber_id;
            inner.next_subscriber_id += 1;
            inner.subscribers.insert(id, Arc::clone(&callback));
            (id, inner.agents.clone())
        };

        callback(&snapshot);
        Subscription {
            inner: Arc::clone(&self.inner),
            id,
        }
    }

    /// Collect live subscribers and the snapshot, then invoke outside the
    /// lock so callbacks may call back into the manager.
    fn notify(&self) {
        let (subscribers, snapshot) = {
            let Ok(inner) = self.inner.lock() else {
                warn!("Agent manager lock poisoned, skipping notification");
                return;
            };
            (
                inner.subscribers.values().cloned().collect::<Vec<_>>(),
                inner.agents.clone(),
            )
        };
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }

    /// Switch the polling scope
    ///
    /// The cache is cleared immediately (subscribers see an empty snapshot)
    /// and a sync against the new scope starts right away.
    pub async fn set_project_context(&self, project: Option<ProjectId>) {
        {
            let Ok(mut inner) = self.inner.lock() else {
                warn!("Agent manager lock poisoned, project context unchanged");
                return;
            };
            if inner.destroyed {
                return;
            }
            inner.agents.clear();
            inner.project = project;
        }
        self.notify();
        // Errors already downgrade to an empty-snapshot notification.
        let _ = self.force_sync().await;
    }

    /// Fetch the active scope's status and replace the cache
    ///
    /// A fetch failure clears the cache (stale data is not retained),
    /// notifies subscribers with the empty snapshot, and still returns
    /// `Ok(())`: sync failures are logged, not surfaced.
    pub async fn force_sync(&self) -> Result<()> {
        let project = {
            let Ok(inner) = self.inner.lock() else {
                warn!("Agent manager lock poisoned, skipping sync");
                return Ok(());
            };
            if inner.destroyed {
                return Ok(());
            }
            inner.project.clone()
        };

        match self.transport.fetch_status(project.as_ref()).await {
            Ok(agents) => {
                let Ok(mut inner) = self.inner.lock() else {
                    warn!("Agent manager lock poisoned, dropping sync result");
                    return Ok(());
                };
                if inner.destroyed {
                    return Ok(());
                }
                inner.agents = agents;
            }
            Err(e) => {
                warn!(error = %e, "agent status sync failed");
                let Ok(mut inner) = self.inner.lock() else {
                    return Ok(());
                };
                inner.agents.clear();
            }
        }

        self.notify();
        Ok(())
    }

    /// Validate and execute a command against the active scope
    ///
    /// Local validation failures return an error without any transport
    /// call. On transport success the agent transitions optimistically and
    /// `last_command` records the success; on transport failure the status
    /// is left untouched and `last_command` records the failure.
    pub async fn execute_command(
        &self,
        agent_id: &str,
        command: AgentCommand,
        source: &str,
    ) -> Result<()> {
        let project = {
            let Ok(inner) = self.inner.lock() else {
                return Err(Error::internal("Agent manager lock poisoned"));
            };
            let agent = inner
                .agents
                .iter()
                .find(|a| a.id == agent_id)
                .ok_or_else(|| Error::validation("Agent not found"))?;
            validate_transition(agent, command)?;
            inner.project.clone()
        };

        let request = CommandRequest {
            agent_id: agent_id.to_string(),
            command: command.as_str().to_string(),
            source: source.to_string(),
        };
        let sent = self.transport.send_command(project.as_ref(), &request).await;

        let outcome = match &sent {
            Ok(_) => CommandOutcome::Success,
            Err(e) => {
                warn!(agent_id, command = command.as_str(), error = %e, "agent command failed");
                CommandOutcome::Failed
            }
        };

        {
            let Ok(mut inner) = self.inner.lock() else {
                return Err(Error::internal("Agent manager lock poisoned"));
            };
            if let Some(agent) = inner.agents.iter_mut().find(|a| a.id == agent_id) {
                if outcome == CommandOutcome::Success {
                    agent.set_status(command.target_status());
                }
                agent.last_command = Some(CommandRecord {
                    command,
                    timestamp: now_unix_millis(),
                    source: source.to_string(),
                    result: outcome,
                });
            }
        }
        self.notify();

        sent.map(|_| ())
    }

    /// Merge a partial out-of-band update into the matching cached agent
    pub fn apply_status_event(&self, event: &StatusEvent) {
        let changed = {
            let Ok(mut inner) = self.inner.lock() else {
                warn!("Agent manager lock poisoned, dropping status event");
                return;
            };
            match inner.agents.iter_mut().find(|a| a.id == event.agent_id) {
                Some(agent) => {
                    if let Some(status) = event.status {
                        agent.set_status(status);
                    }
                    true
                }
                None => {
                    debug!(agent_id = %event.agent_id, "status event for unknown agent");
                    false
                }
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Start periodic syncing; replaces (and aborts) any previous poller
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await; // immediate first tick
            loop {
                ticker.tick().await;
                let _ = manager.force_sync().await;
            }
        });

        let Ok(mut poll) = self.poll.lock() else {
            warn!("Poll handle lock poisoned, aborting new poller");
            handle.abort();
            return;
        };
        if let Some(previous) = poll.replace(handle) {
            previous.abort();
        }
    }

    /// Tear down: abort polling, drop subscribers, clear the cache
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn destroy(&self) {
        if let Ok(mut poll) = self.poll.lock() {
            if let Some(handle) = poll.take() {
                handle.abort();
            }
        }
        let Ok(mut inner) = self.inner.lock() else {
            warn!("Agent manager lock poisoned during teardown");
            return;
        };
        inner.destroyed = true;
        inner.agents.clear();
        inner.subscribers.clear();
    }
}

impl Drop for AgentControlManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// The transition rules the server applies, checked locally so a doomed
/// command never generates traffic.
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

fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
