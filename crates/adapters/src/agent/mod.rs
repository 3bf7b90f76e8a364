// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle on top of a session driver
//!
//! An [`AgentManager`] speaks agent addresses and turns them into session
//! operations: start with zombie cleanup, readiness probing, graceful stop,
//! and in-place respawn.
//!
//! ```text
//! role manager ──► AgentManager ──► TownSessions ──► driver
//!                       │
//!                       └── readiness probe task (watch channel)
//! ```

mod config;
mod factory;
mod manager;
mod readiness;

pub use config::{AgentConfig, SessionHook};
pub use factory::AgentManagerFactory;
pub use manager::AgentManager;
pub use readiness::{PromptChecker, ReadinessChecker};

use crate::session::SessionError;
use gt_core::AgentAddress;
use thiserror::Error;

/// Errors from agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent already running: {0}")]
    AlreadyRunning(AgentAddress),
    #[error("agent not running: {0}")]
    NotRunning(AgentAddress),
    #[error("timed out waiting for {0} to become ready")]
    Timeout(AgentAddress),
    #[error("{op}: {message}")]
    Hook { op: &'static str, message: String },
    #[error("{op}: {source}")]
    Session {
        op: &'static str,
        #[source]
        source: SessionError,
    },
}

impl AgentError {
    /// Adapter for `map_err` that names the failing operation.
    pub(crate) fn session(op: &'static str) -> impl FnOnce(SessionError) -> Self {
        move |source| Self::Session { op, source }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
