// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Address-level agent lifecycle.

use super::config::AgentConfig;
use super::readiness::{probe, ProbeState};
use super::AgentError;
use crate::session::{SessionAdapter, SessionError};
use gt_core::{AgentAddress, SessionId, SessionInfo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Pause between `C-c` and teardown on a graceful stop.
const GRACEFUL_DRAIN: Duration = Duration::from_millis(100);

struct Probe {
    state: watch::Receiver<ProbeState>,
    started_at: Instant,
    task: JoinHandle<()>,
}

/// Lifecycle operations keyed by [`AgentAddress`].
///
/// The address string is the session id handed to the driver, so `S` is
/// normally a [`TownSessions`](crate::session::TownSessions).
#[derive(Clone)]
pub struct AgentManager<S> {
    sessions: S,
    config: AgentConfig,
    probes: Arc<Mutex<HashMap<String, Probe>>>,
}

impl<S: SessionAdapter> AgentManager<S> {
    pub fn new(sessions: S, config: AgentConfig) -> Self {
        Self {
            sessions,
            config,
            probes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Whether the session's foreground process is a configured agent
    /// process. Without process names any existing session counts.
    async fn is_live(&self, id: &str) -> bool {
        if self.config.process_names.is_empty() {
            return true;
        }
        self.sessions.is_running(id, &self.config.process_names).await
    }

    /// Start the agent at `addr`, replacing a zombie session if one exists.
    ///
    /// Returns once the session exists and the post-create callback has run;
    /// readiness is probed in the background (see [`wait_ready`](Self::wait_ready)).
    pub async fn start(
        &self,
        addr: &AgentAddress,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, AgentError> {
        let id = addr.as_str();

        let existing = self
            .sessions
            .exists(id)
            .await
            .map_err(AgentError::session("checking session"))?;
        if existing {
            if self.is_live(id).await {
                return Err(AgentError::AlreadyRunning(addr.clone()));
            }
            tracing::warn!(address = %addr, "killing zombie session");
            self.sessions
                .stop(id)
                .await
                .map_err(AgentError::session("killing zombie session"))?;
        }

        let command = self.config.command_with_env(command);
        let session_id = match self.sessions.start(id, work_dir, &command).await {
            Ok(session_id) => session_id,
            // Another caller created the session after the existence check.
            Err(e @ SessionError::Duplicate(_)) => {
                if self.is_live(id).await {
                    return Err(AgentError::AlreadyRunning(addr.clone()));
                }
                return Err(AgentError::session("starting session")(e));
            }
            Err(e) => return Err(AgentError::session("starting session")(e)),
        };
        tracing::info!(address = %addr, work_dir = %work_dir.display(), "agent session started");

        if let Some(hook) = &self.config.on_created {
            if let Err(message) = hook.run(id).await {
                if let Err(e) = self.sessions.stop(id).await {
                    tracing::warn!(address = %addr, error = %e, "cleanup after callback failure failed");
                }
                return Err(AgentError::Hook {
                    op: "running post-create callback",
                    message,
                });
            }
        }

        self.spawn_probe(id, true);
        Ok(session_id)
    }

    /// Launch a readiness probe for `id`, replacing any previous one.
    fn spawn_probe(&self, id: &str, run_startup_hook: bool) -> watch::Receiver<ProbeState> {
        let (tx, rx) = watch::channel(ProbeState::Pending);
        let sessions = self.sessions.clone();
        let config = self.config.clone();
        let session = id.to_string();
        let task = tokio::spawn(async move {
            let state = probe(&sessions, &session, &config, run_startup_hook).await;
            let _ = tx.send(state);
        });
        let previous = self.probes.lock().insert(
            id.to_string(),
            Probe {
                state: rx.clone(),
                started_at: Instant::now(),
                task,
            },
        );
        if let Some(previous) = previous {
            previous.task.abort();
        }
        rx
    }

    fn drop_probe(&self, id: &str) {
        if let Some(probe) = self.probes.lock().remove(id) {
            probe.task.abort();
        }
    }

    /// Block until the agent's readiness probe succeeds.
    ///
    /// Sessions started elsewhere get a fresh probe (without the startup
    /// hook).
    pub async fn wait_ready(&self, addr: &AgentAddress) -> Result<(), AgentError> {
        let id = addr.as_str();
        let exists = self
            .sessions
            .exists(id)
            .await
            .map_err(AgentError::session("checking session"))?;
        if !exists {
            return Err(AgentError::NotRunning(addr.clone()));
        }

        let tracked = self
            .probes
            .lock()
            .get(id)
            .map(|p| (p.state.clone(), p.started_at));
        let (mut state, started_at) = match tracked {
            Some(tracked) => tracked,
            None => (self.spawn_probe(id, false), Instant::now()),
        };

        // The probe bounds itself by the same timeout; allow one poll of slack
        let deadline = started_at + self.config.readiness_timeout + crate::env::ready_poll_ms();
        let settled = tokio::time::timeout_at(deadline, async {
            state.wait_for(ProbeState::is_settled).await.map(|s| *s)
        })
        .await;

        match settled {
            Ok(Ok(ProbeState::Ready)) => Ok(()),
            Ok(Ok(_)) | Err(_) => Err(AgentError::Timeout(addr.clone())),
            // Probe task was replaced or aborted; the session went away under us
            Ok(Err(_)) => Err(AgentError::NotRunning(addr.clone())),
        }
    }

    /// Stop the agent. Graceful stops interrupt the process with `C-c` first.
    ///
    /// Stopping a missing agent is a no-op.
    pub async fn stop(&self, addr: &AgentAddress, graceful: bool) -> Result<(), AgentError> {
        let id = addr.as_str();
        let exists = self
            .sessions
            .exists(id)
            .await
            .map_err(AgentError::session("checking session"))?;
        if !exists {
            self.drop_probe(id);
            return Ok(());
        }

        if graceful {
            if let Err(e) = self.sessions.send_control(id, "C-c").await {
                tracing::warn!(address = %addr, error = %e, "interrupt before stop failed");
            }
            tokio::time::sleep(GRACEFUL_DRAIN).await;
        }

        self.sessions
            .stop(id)
            .await
            .map_err(AgentError::session("stopping session"))?;
        self.drop_probe(id);
        tracing::info!(address = %addr, graceful, "agent stopped");
        Ok(())
    }

    /// Replace the agent's process in place with its original start command.
    ///
    /// When `addr` is the calling agent's own session, the caller is
    /// terminated by the respawn and this does not return.
    pub async fn respawn(&self, addr: &AgentAddress) -> Result<(), AgentError> {
        let id = addr.as_str();
        let exists = self
            .sessions
            .exists(id)
            .await
            .map_err(AgentError::session("checking session"))?;
        if !exists {
            return Err(AgentError::NotRunning(addr.clone()));
        }

        let command = self
            .sessions
            .get_start_command(id)
            .await
            .map_err(AgentError::session("reading start command"))?;
        self.sessions
            .respawn(id, &command)
            .await
            .map_err(AgentError::session("respawning session"))?;
        tracing::info!(address = %addr, "agent respawned");

        self.spawn_probe(id, true);
        Ok(())
    }

    /// Session exists and, when process names are configured, runs the agent.
    pub async fn exists(&self, addr: &AgentAddress) -> Result<bool, AgentError> {
        let id = addr.as_str();
        let exists = self
            .sessions
            .exists(id)
            .await
            .map_err(AgentError::session("checking session"))?;
        Ok(exists && self.is_live(id).await)
    }

    /// Live agents known to the driver. Zombies are hidden when process
    /// names are configured.
    pub async fn list(&self) -> Result<Vec<AgentAddress>, AgentError> {
        let ids = self
            .sessions
            .list()
            .await
            .map_err(AgentError::session("listing sessions"))?;
        let mut agents = Vec::with_capacity(ids.len());
        for id in ids {
            let Ok(addr) = AgentAddress::parse(id.as_str()) else {
                continue;
            };
            if self.is_live(id.as_str()).await {
                agents.push(addr);
            }
        }
        Ok(agents)
    }

    pub async fn nudge(&self, addr: &AgentAddress, message: &str) -> Result<(), AgentError> {
        self.sessions
            .nudge(addr.as_str(), message)
            .await
            .map_err(AgentError::session("nudging session"))
    }

    pub async fn send(&self, addr: &AgentAddress, text: &str) -> Result<(), AgentError> {
        self.sessions
            .send(addr.as_str(), text)
            .await
            .map_err(AgentError::session("sending to session"))
    }

    pub async fn send_control(&self, addr: &AgentAddress, key: &str) -> Result<(), AgentError> {
        self.sessions
            .send_control(addr.as_str(), key)
            .await
            .map_err(AgentError::session("sending key"))
    }

    pub async fn capture(&self, addr: &AgentAddress, lines: u32) -> Result<String, AgentError> {
        self.sessions
            .capture(addr.as_str(), lines)
            .await
            .map_err(AgentError::session("capturing output"))
    }

    pub async fn capture_all(&self, addr: &AgentAddress) -> Result<String, AgentError> {
        self.sessions
            .capture_all(addr.as_str())
            .await
            .map_err(AgentError::session("capturing output"))
    }

    pub async fn get_info(&self, addr: &AgentAddress) -> Result<SessionInfo, AgentError> {
        self.sessions
            .get_info(addr.as_str())
            .await
            .map_err(AgentError::session("reading session info"))
    }

    pub async fn attach(&self, addr: &AgentAddress) -> Result<(), AgentError> {
        self.sessions
            .attach(addr.as_str())
            .await
            .map_err(AgentError::session("attaching to session"))
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
