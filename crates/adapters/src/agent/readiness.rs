// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness detection for freshly started agents.

use super::config::AgentConfig;
use crate::session::SessionAdapter;
use tokio::time::Instant;

/// Lines of pane output handed to a [`ReadinessChecker`].
pub(crate) const PROBE_LINES: u32 = 50;

/// Decides from recent pane output whether an agent accepts input.
pub trait ReadinessChecker: Send + Sync {
    fn is_ready(&self, output: &str) -> bool;
}

impl<F> ReadinessChecker for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_ready(&self, output: &str) -> bool {
        self(output)
    }
}

/// Ready when the last non-blank line starts with a prompt prefix.
///
/// Trailing whitespace in the prefix is ignored since panes trim it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptChecker {
    prefix: String,
}

impl PromptChecker {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl ReadinessChecker for PromptChecker {
    fn is_ready(&self, output: &str) -> bool {
        output
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| line.trim_start().starts_with(self.prefix.trim_end()))
    }
}

/// Outcome published by a readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeState {
    Pending,
    Ready,
    TimedOut,
}

impl ProbeState {
    pub(crate) fn is_settled(&self) -> bool {
        !matches!(self, ProbeState::Pending)
    }
}

/// Run the startup hook (if asked), then wait for readiness.
///
/// Without a checker the configured startup delay stands in for detection.
pub(crate) async fn probe<S: SessionAdapter>(
    sessions: &S,
    id: &str,
    config: &AgentConfig,
    run_startup_hook: bool,
) -> ProbeState {
    let deadline = Instant::now() + config.readiness_timeout;

    if run_startup_hook {
        if let Some(hook) = &config.startup_hook {
            if let Err(e) = hook.run(id).await {
                tracing::warn!(session = id, error = %e, "startup hook failed (non-fatal)");
            }
        }
    }

    let Some(checker) = &config.readiness else {
        let delay = config
            .startup_delay
            .min(deadline.saturating_duration_since(Instant::now()));
        tokio::time::sleep(delay).await;
        return ProbeState::Ready;
    };

    let poll = crate::env::ready_poll_ms();
    loop {
        if let Ok(output) = sessions.capture(id, PROBE_LINES).await {
            if checker.is_ready(&output) {
                tracing::debug!(session = id, "agent ready");
                return ProbeState::Ready;
            }
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::warn!(
                session = id,
                timeout_ms = config.readiness_timeout.as_millis() as u64,
                "agent not ready before timeout"
            );
            return ProbeState::TimedOut;
        }
        tokio::time::sleep(poll.min(remaining)).await;
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
