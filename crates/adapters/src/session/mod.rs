// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session drivers
//!
//! A [`SessionAdapter`] manages a collection of named terminal sessions.
//! Drivers compose by delegation:
//!
//! ```text
//! TownSessions ──► any driver (logical address ◄─► unique name)
//! MirrorSessionAdapter ──► remote (truth) + local (attach UX)
//! TmuxAdapter / RemoteTmuxAdapter / FakeSessionAdapter (leaves)
//! ```

mod mirror;
mod nudge;
mod remote;
mod tmux;
mod town;

pub use mirror::{MirrorSessionAdapter, MirrorSource};
pub use nudge::{deliver_nudge, NudgeTiming};
pub use remote::{RemoteTmuxAdapter, CALLBACK_TRANSPORT_VAR};
pub use tmux::TmuxAdapter;
pub use town::TownSessions;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use gt_core::{SessionId, SessionInfo};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("duplicate session: {0}")]
    Duplicate(String),
    #[error("invalid session name: {0}")]
    Invalid(String),
    #[error("session not running: {0}")]
    NotRunning(String),
    #[error("timed out waiting for {0}")]
    Timeout(String),
    #[error("not inside a tmux client")]
    NotInClient,
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter for managing named terminal sessions (tmux, etc.)
///
/// Every operation on one session is serialised by the driver; there is no
/// ordering between sessions.
#[async_trait]
pub trait SessionAdapter: Clone + Send + Sync + 'static {
    /// Create a session running `command` in `work_dir`.
    ///
    /// Fails with [`SessionError::Duplicate`] if the name is taken and
    /// [`SessionError::Invalid`] if it is empty.
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError>;

    /// Destroy a session. Missing sessions are not an error.
    async fn stop(&self, id: &str) -> Result<(), SessionError>;

    /// Atomically replace the session's process with `command`.
    async fn respawn(&self, id: &str, command: &str) -> Result<(), SessionError>;

    /// Check whether a session exists
    async fn exists(&self, id: &str) -> Result<bool, SessionError>;

    /// Send text followed by Enter
    async fn send(&self, id: &str, text: &str) -> Result<(), SessionError>;

    /// Paste text literally, without a trailing Enter
    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError>;

    /// Send a symbolic key (`C-c`, `Escape`, `Enter`, ...)
    async fn send_control(&self, id: &str, key: &str) -> Result<(), SessionError>;

    /// Reliable message delivery; see [`deliver_nudge`].
    async fn nudge(&self, id: &str, message: &str) -> Result<(), SessionError>;

    /// Capture up to the last `lines` lines of the pane
    async fn capture(&self, id: &str, lines: u32) -> Result<String, SessionError>;

    /// Capture the full scrollback
    async fn capture_all(&self, id: &str) -> Result<String, SessionError>;

    /// Whether the pane's foreground process matches one of `process_names`.
    ///
    /// Always false for an empty list or a missing session.
    async fn is_running(&self, id: &str, process_names: &[String]) -> bool;

    /// Wait until [`is_running`](Self::is_running) holds or `timeout` elapses.
    async fn wait_for(
        &self,
        id: &str,
        timeout: Duration,
        process_names: &[String],
    ) -> Result<(), SessionError> {
        let poll = crate::env::ready_poll_ms();
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_running(id, process_names).await {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SessionError::Timeout(format!(
                    "{id} to run one of [{}]",
                    process_names.join(", ")
                )));
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// List every session known to this driver
    async fn list(&self) -> Result<Vec<SessionId>, SessionError>;

    /// Session metadata
    async fn get_info(&self, id: &str) -> Result<SessionInfo, SessionError>;

    /// The command line the session was started (or last respawned) with
    async fn get_start_command(&self, id: &str) -> Result<String, SessionError>;

    /// Hand the current terminal to the session until the user detaches
    async fn attach(&self, id: &str) -> Result<(), SessionError>;

    /// Switch the current multiplexer client to the session
    async fn switch_to(&self, id: &str) -> Result<(), SessionError>;
}
