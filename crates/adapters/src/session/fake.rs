// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory session adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::mirror::MirrorSource;
use super::nudge::{deliver_nudge, NudgeTiming};
use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use gt_core::{SessionId, SessionInfo};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Pane contents of a freshly started session, so a prompt checker for
/// `"> "` matches immediately.
const INITIAL_PROMPT: &str = "> ";

/// Recorded mutating session call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Start {
        name: String,
        work_dir: PathBuf,
        command: String,
    },
    Stop {
        id: String,
    },
    Respawn {
        id: String,
        command: String,
    },
    Send {
        id: String,
        text: String,
    },
    SendLiteral {
        id: String,
        text: String,
    },
    SendControl {
        id: String,
        key: String,
    },
    Nudge {
        id: String,
        message: String,
    },
    Attach {
        id: String,
    },
    SwitchTo {
        id: String,
    },
}

/// Fake session state
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub name: String,
    pub work_dir: PathBuf,
    pub command: String,
    /// `KEY=VALUE` prefixes parsed off the start command
    pub env: BTreeMap<String, String>,
    pub buffer: Vec<String>,
    pub alive: bool,
    pub control_keys: Vec<String>,
    pub nudges: Vec<String>,
    pub created: u64,
    pub attached: bool,
}

impl FakeSession {
    fn new(name: &str, work_dir: &Path, command: &str) -> Self {
        Self {
            name: name.to_string(),
            work_dir: work_dir.to_path_buf(),
            command: command.to_string(),
            env: parse_env_prefix(command),
            buffer: vec![INITIAL_PROMPT.to_string()],
            alive: true,
            control_keys: Vec::new(),
            nudges: Vec::new(),
            created: now_secs(),
            attached: false,
        }
    }

    fn tail(&self, lines: usize) -> String {
        let start = self.buffer.len().saturating_sub(lines);
        self.buffer[start..].join("\n")
    }
}

#[derive(Default)]
struct FakeSessionState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
    /// Remaining injected failures per (session, control key)
    control_failures: HashMap<(String, String), u32>,
    in_client: bool,
    client_session: Option<String>,
}

/// In-memory session adapter for testing
#[derive(Clone)]
pub struct FakeSessionAdapter {
    inner: Arc<RwLock<FakeSessionState>>,
    nudge_timing: NudgeTiming,
}

impl Default for FakeSessionAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(FakeSessionState {
                in_client: true,
                ..FakeSessionState::default()
            })),
            nudge_timing: NudgeTiming::immediate(),
        }
    }
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use real nudge delays instead of the immediate default
    pub fn with_nudge_timing(mut self, timing: NudgeTiming) -> Self {
        self.nudge_timing = timing;
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.read().calls.clone()
    }

    /// Get a snapshot of a session by name
    pub fn get_session(&self, id: &str) -> Option<FakeSession> {
        self.inner.read().sessions.get(id).cloned()
    }

    /// Names of all sessions, sorted
    pub fn session_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().sessions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Add a pre-existing session directly (bypasses `start` and the call log)
    pub fn add_session(&self, id: &str, alive: bool) {
        let mut session = FakeSession::new(id, Path::new("/"), "");
        session.alive = alive;
        self.inner.write().sessions.insert(id.to_string(), session);
    }

    /// Set the process-alive flag
    pub fn set_alive(&self, id: &str, alive: bool) {
        if let Some(session) = self.inner.write().sessions.get_mut(id) {
            session.alive = alive;
        }
    }

    /// Replace the pane buffer
    pub fn set_output(&self, id: &str, lines: Vec<String>) {
        if let Some(session) = self.inner.write().sessions.get_mut(id) {
            session.buffer = lines;
        }
    }

    /// Append one line to the pane buffer
    pub fn append_output(&self, id: &str, line: &str) {
        if let Some(session) = self.inner.write().sessions.get_mut(id) {
            session.buffer.push(line.to_string());
        }
    }

    /// Control keys received by a session, in order
    pub fn control_keys(&self, id: &str) -> Vec<String> {
        self.inner
            .read()
            .sessions
            .get(id)
            .map(|s| s.control_keys.clone())
            .unwrap_or_default()
    }

    /// Messages delivered by `nudge`, in order
    pub fn nudges(&self, id: &str) -> Vec<String> {
        self.inner
            .read()
            .sessions
            .get(id)
            .map(|s| s.nudges.clone())
            .unwrap_or_default()
    }

    /// The recorded start command
    pub fn start_command(&self, id: &str) -> Option<String> {
        self.inner.read().sessions.get(id).map(|s| s.command.clone())
    }

    /// Make the next `times` sends of `key` to `id` fail
    pub fn fail_control_key(&self, id: &str, key: &str, times: u32) {
        self.inner
            .write()
            .control_failures
            .insert((id.to_string(), key.to_string()), times);
    }

    /// Simulate running outside (or inside) a multiplexer client
    pub fn set_in_client(&self, in_client: bool) {
        self.inner.write().in_client = in_client;
    }

    /// Session the simulated client is currently showing
    pub fn client_session(&self) -> Option<String> {
        self.inner.read().client_session.clone()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Parse leading `KEY=VALUE` words off a command line.
fn parse_env_prefix(command: &str) -> BTreeMap<String, String> {
    command
        .split_whitespace()
        .map_while(|word| {
            let (key, value) = word.split_once('=')?;
            let valid_key = !key.is_empty()
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !key.starts_with(|c: char| c.is_ascii_digit());
            valid_key.then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

fn not_found(id: &str) -> SessionError {
    SessionError::NotFound(id.to_string())
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError> {
        if name.is_empty() {
            return Err(SessionError::Invalid("empty session name".to_string()));
        }
        let mut inner = self.inner.write();
        if inner.sessions.contains_key(name) {
            return Err(SessionError::Duplicate(name.to_string()));
        }
        inner.calls.push(SessionCall::Start {
            name: name.to_string(),
            work_dir: work_dir.to_path_buf(),
            command: command.to_string(),
        });
        inner
            .sessions
            .insert(name.to_string(), FakeSession::new(name, work_dir, command));
        Ok(SessionId::new(name))
    }

    async fn stop(&self, id: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        inner.calls.push(SessionCall::Stop { id: id.to_string() });
        inner.sessions.remove(id);
        Ok(())
    }

    async fn respawn(&self, id: &str, command: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        let session = inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotRunning(id.to_string()))?;
        session.command = command.to_string();
        session.env = parse_env_prefix(command);
        session.buffer = vec![INITIAL_PROMPT.to_string()];
        session.alive = true;
        inner.calls.push(SessionCall::Respawn {
            id: id.to_string(),
            command: command.to_string(),
        });
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        Ok(self.inner.read().sessions.contains_key(id))
    }

    async fn send(&self, id: &str, text: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        let session = inner.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        session.buffer.extend(text.split('\n').map(String::from));
        inner.calls.push(SessionCall::Send {
            id: id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        let session = inner.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            match session.buffer.last_mut() {
                Some(last) => last.push_str(first),
                None => session.buffer.push(first.to_string()),
            }
        }
        session.buffer.extend(parts.map(String::from));
        inner.calls.push(SessionCall::SendLiteral {
            id: id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_control(&self, id: &str, key: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        if !inner.sessions.contains_key(id) {
            return Err(not_found(id));
        }
        if let Some(remaining) = inner
            .control_failures
            .get_mut(&(id.to_string(), key.to_string()))
        {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SessionError::CommandFailed(format!(
                    "injected failure sending {key} to {id}"
                )));
            }
        }
        if let Some(session) = inner.sessions.get_mut(id) {
            session.control_keys.push(key.to_string());
        }
        inner.calls.push(SessionCall::SendControl {
            id: id.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn nudge(&self, id: &str, message: &str) -> Result<(), SessionError> {
        if !self.exists(id).await? {
            return Err(not_found(id));
        }
        deliver_nudge(self, id, message, &self.nudge_timing).await?;
        let mut inner = self.inner.write();
        if let Some(session) = inner.sessions.get_mut(id) {
            session.nudges.push(message.to_string());
        }
        inner.calls.push(SessionCall::Nudge {
            id: id.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn capture(&self, id: &str, lines: u32) -> Result<String, SessionError> {
        let inner = self.inner.read();
        let session = inner.sessions.get(id).ok_or_else(|| not_found(id))?;
        Ok(session.tail(lines as usize))
    }

    async fn capture_all(&self, id: &str) -> Result<String, SessionError> {
        let inner = self.inner.read();
        let session = inner.sessions.get(id).ok_or_else(|| not_found(id))?;
        Ok(session.buffer.join("\n"))
    }

    async fn is_running(&self, id: &str, process_names: &[String]) -> bool {
        if process_names.is_empty() {
            return false;
        }
        self.inner
            .read()
            .sessions
            .get(id)
            .map(|s| s.alive)
            .unwrap_or(false)
    }

    async fn list(&self) -> Result<Vec<SessionId>, SessionError> {
        Ok(self
            .session_names()
            .into_iter()
            .map(SessionId::new)
            .collect())
    }

    async fn get_info(&self, id: &str) -> Result<SessionInfo, SessionError> {
        let inner = self.inner.read();
        let session = inner.sessions.get(id).ok_or_else(|| not_found(id))?;
        Ok(SessionInfo {
            name: session.name.clone(),
            created: session.created.to_string(),
            attached: session.attached,
            windows: 1,
            activity: session.created.to_string(),
            last_attached: String::new(),
        })
    }

    async fn get_start_command(&self, id: &str) -> Result<String, SessionError> {
        self.start_command(id).ok_or_else(|| not_found(id))
    }

    async fn attach(&self, id: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        let session = inner.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        session.attached = true;
        inner.calls.push(SessionCall::Attach { id: id.to_string() });
        Ok(())
    }

    async fn switch_to(&self, id: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write();
        if !inner.in_client {
            return Err(SessionError::NotInClient);
        }
        if !inner.sessions.contains_key(id) {
            return Err(not_found(id));
        }
        if inner.client_session.as_deref() == Some(id) {
            return Ok(());
        }
        inner.client_session = Some(id.to_string());
        inner.calls.push(SessionCall::SwitchTo { id: id.to_string() });
        Ok(())
    }
}

/// The fake can stand in for a remote driver; its mirror entry command is
/// a recognisable placeholder.
impl MirrorSource for FakeSessionAdapter {
    fn attach_command(&self, id: &str) -> String {
        format!("fake-attach {id}")
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
