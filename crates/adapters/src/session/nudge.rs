// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reliable message delivery into an interactive pane.

use super::{SessionAdapter, SessionError};
use std::time::Duration;

/// Delays and retry budget for [`deliver_nudge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NudgeTiming {
    /// Wait after pasting so the multiplexer's paste buffer drains
    pub paste_drain: Duration,
    /// Wait between Escape and the first Enter
    pub escape_settle: Duration,
    /// Wait between failed Enter attempts
    pub retry_backoff: Duration,
    /// Total Enter attempts
    pub enter_attempts: u32,
}

impl Default for NudgeTiming {
    fn default() -> Self {
        Self {
            paste_drain: crate::env::nudge_paste_ms(),
            escape_settle: crate::env::nudge_escape_ms(),
            retry_backoff: crate::env::nudge_retry_ms(),
            enter_attempts: crate::env::nudge_attempts(),
        }
    }
}

impl NudgeTiming {
    /// No delays, default attempt budget.
    pub fn immediate() -> Self {
        Self {
            paste_drain: Duration::ZERO,
            escape_settle: Duration::ZERO,
            retry_backoff: Duration::ZERO,
            enter_attempts: 3,
        }
    }
}

/// Deliver `message` so it is submitted even if the pane is in an editor
/// mode or debouncing pastes.
///
/// Pastes the message literally, lets the paste drain, sends a best-effort
/// `Escape`, then `Enter` with retries. A successful `Enter` is success.
pub async fn deliver_nudge<S: SessionAdapter>(
    sessions: &S,
    id: &str,
    message: &str,
    timing: &NudgeTiming,
) -> Result<(), SessionError> {
    sessions.send_literal(id, message).await?;
    tokio::time::sleep(timing.paste_drain).await;

    if let Err(e) = sessions.send_control(id, "Escape").await {
        tracing::debug!(id, error = %e, "nudge escape failed (ignored)");
    }
    tokio::time::sleep(timing.escape_settle).await;

    let attempts = timing.enter_attempts.max(1);
    let mut last_error = None;
    for attempt in 1..=attempts {
        match sessions.send_control(id, "Enter").await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(id, attempt, error = %e, "nudge enter failed");
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(timing.retry_backoff).await;
                }
            }
        }
    }

    Err(SessionError::Delivery(format!(
        "{id}: enter not accepted after {attempts} attempts: {}",
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string())
    )))
}

#[cfg(test)]
#[path = "nudge_tests.rs"]
mod tests;
