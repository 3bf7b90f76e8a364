// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Nudge paste-buffer drain before Escape (default: 500ms).
pub fn nudge_paste_ms() -> Duration {
    parse_duration_ms("GT_NUDGE_PASTE_MS").unwrap_or(Duration::from_millis(500))
}

/// Nudge pause between Escape and Enter (default: 100ms).
pub fn nudge_escape_ms() -> Duration {
    parse_duration_ms("GT_NUDGE_ESCAPE_MS").unwrap_or(Duration::from_millis(100))
}

/// Nudge backoff between Enter attempts (default: 200ms).
pub fn nudge_retry_ms() -> Duration {
    parse_duration_ms("GT_NUDGE_RETRY_MS").unwrap_or(Duration::from_millis(200))
}

/// Total Enter attempts per nudge (default: 3, minimum 1).
pub fn nudge_attempts() -> u32 {
    std::env::var("GT_NUDGE_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .map(|n| n.max(1))
        .unwrap_or(3)
}

/// Shortest accepted poll interval.
pub const MIN_POLL: Duration = Duration::from_millis(10);

/// Poll interval for readiness probes and process waits (default: 100ms,
/// minimum 10ms).
pub fn ready_poll_ms() -> Duration {
    parse_duration_ms("GT_READY_POLL_MS")
        .unwrap_or(Duration::from_millis(100))
        .max(MIN_POLL)
}

/// Whether un-suffixed legacy session names are still resolved (default: on).
pub fn legacy_sessions_enabled() -> bool {
    !matches!(
        std::env::var("GT_LEGACY_SESSIONS").ok().as_deref(),
        Some("0" | "false" | "no" | "off")
    )
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
