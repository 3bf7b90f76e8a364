// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::session::{SessionAdapter, SessionError};
use async_trait::async_trait;
use gt_core::{SessionId, SessionInfo};
use std::path::Path;
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any SessionAdapter
#[derive(Clone)]
pub struct TracedSession<S> {
    inner: S,
}

impl<S> TracedSession<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SessionAdapter> SessionAdapter for TracedSession<S> {
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError> {
        async {
            tracing::info!(command, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.start(name, work_dir, command).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(id) => tracing::info!(session_id = id.as_str(), elapsed_ms, "session created"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "start failed"),
            }
            result
        }
        .instrument(tracing::info_span!("session.start", name, work_dir = %work_dir.display()))
        .await
    }

    async fn stop(&self, id: &str) -> Result<(), SessionError> {
        let result = self.inner.stop(id).await;
        tracing::info_span!("session.stop", id).in_scope(|| match &result {
            Ok(()) => tracing::info!("stopped"),
            Err(e) => tracing::warn!(error = %e, "stop failed"),
        });
        result
    }

    async fn respawn(&self, id: &str, command: &str) -> Result<(), SessionError> {
        async {
            tracing::info!(command, "respawning");
            let result = self.inner.respawn(id, command).await;
            match &result {
                Ok(()) => tracing::info!("respawned"),
                Err(e) => tracing::error!(error = %e, "respawn failed"),
            }
            result
        }
        .instrument(tracing::info_span!("session.respawn", id))
        .await
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        let result = self.inner.exists(id).await;
        tracing::trace!(id, exists = ?result.as_ref().ok(), "checked");
        result
    }

    async fn send(&self, id: &str, text: &str) -> Result<(), SessionError> {
        tracing::info_span!("session.send", id)
            .in_scope(|| tracing::debug!(input_len = text.len(), "sending"));
        let result = self.inner.send(id, text).await;
        if let Err(ref e) = result {
            tracing::error!(id, error = %e, "send failed");
        }
        result
    }

    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError> {
        let result = self.inner.send_literal(id, text).await;
        if let Err(ref e) = result {
            tracing::error!(id, error = %e, "send_literal failed");
        }
        result
    }

    async fn send_control(&self, id: &str, key: &str) -> Result<(), SessionError> {
        let result = self.inner.send_control(id, key).await;
        if let Err(ref e) = result {
            tracing::warn!(id, key, error = %e, "send_control failed");
        }
        result
    }

    async fn nudge(&self, id: &str, message: &str) -> Result<(), SessionError> {
        async {
            tracing::debug!(message_len = message.len(), "nudging");
            let start = std::time::Instant::now();
            let result = self.inner.nudge(id, message).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "nudge delivered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "nudge failed"),
            }
            result
        }
        .instrument(tracing::info_span!("session.nudge", id))
        .await
    }

    async fn capture(&self, id: &str, lines: u32) -> Result<String, SessionError> {
        let result = self.inner.capture(id, lines).await;
        tracing::info_span!("session.capture", id, lines).in_scope(|| {
            tracing::debug!(
                captured_len = result.as_ref().map(|s| s.len()).ok(),
                "captured"
            )
        });
        result
    }

    async fn capture_all(&self, id: &str) -> Result<String, SessionError> {
        self.inner.capture_all(id).await
    }

    async fn is_running(&self, id: &str, process_names: &[String]) -> bool {
        let running = self.inner.is_running(id, process_names).await;
        tracing::trace!(id, running, "checked");
        running
    }

    async fn wait_for(
        &self,
        id: &str,
        timeout: Duration,
        process_names: &[String],
    ) -> Result<(), SessionError> {
        let result = self.inner.wait_for(id, timeout, process_names).await;
        if let Err(ref e) = result {
            tracing::warn!(id, timeout_ms = timeout.as_millis() as u64, error = %e, "wait_for failed");
        }
        result
    }

    async fn list(&self) -> Result<Vec<SessionId>, SessionError> {
        let result = self.inner.list().await;
        tracing::trace!(count = ?result.as_ref().map(Vec::len).ok(), "listed");
        result
    }

    async fn get_info(&self, id: &str) -> Result<SessionInfo, SessionError> {
        self.inner.get_info(id).await
    }

    async fn get_start_command(&self, id: &str) -> Result<String, SessionError> {
        self.inner.get_start_command(id).await
    }

    async fn attach(&self, id: &str) -> Result<(), SessionError> {
        tracing::info!(id, "attaching");
        self.inner.attach(id).await
    }

    async fn switch_to(&self, id: &str) -> Result<(), SessionError> {
        let result = self.inner.switch_to(id).await;
        if let Err(ref e) = result {
            tracing::warn!(id, error = %e, "switch_to failed");
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
