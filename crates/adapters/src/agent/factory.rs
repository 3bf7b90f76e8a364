// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-role agent managers for one town.

use super::config::AgentConfig;
use super::manager::AgentManager;
use super::readiness::PromptChecker;
use crate::session::{SessionAdapter, TownSessions};
use gt_core::{identity_env, AgentAddress};
use std::path::{Path, PathBuf};

/// Foreground processes that mean an agent is alive.
pub const DEFAULT_PROCESS_NAMES: &[&str] = &["claude", "node"];

/// Prompt the agent CLI shows when it accepts input.
pub const DEFAULT_PROMPT: &str = "> ";

/// Builds town-aware [`AgentManager`]s for role managers.
#[derive(Clone)]
pub struct AgentManagerFactory<S> {
    sessions: S,
    town_root: PathBuf,
    defaults: AgentConfig,
    legacy_fallback: Option<bool>,
}

impl<S: SessionAdapter> AgentManagerFactory<S> {
    pub fn new(sessions: S, town_root: impl AsRef<Path>) -> Self {
        Self {
            sessions,
            town_root: town_root.as_ref().to_path_buf(),
            defaults: Self::role_defaults(),
            legacy_fallback: None,
        }
    }

    /// Process names, prompt checker and default readiness timeout.
    pub fn role_defaults() -> AgentConfig {
        AgentConfig::new()
            .with_process_names(DEFAULT_PROCESS_NAMES.iter().copied())
            .with_readiness(PromptChecker::new(DEFAULT_PROMPT))
    }

    /// Replace the base configuration every manager starts from.
    pub fn with_defaults(mut self, defaults: AgentConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Override the `GT_LEGACY_SESSIONS` setting for the town wrapper.
    pub fn with_legacy_fallback(mut self, enabled: bool) -> Self {
        self.legacy_fallback = Some(enabled);
        self
    }

    pub fn town_root(&self) -> &Path {
        &self.town_root
    }

    /// The town-aware driver every manager from this factory shares.
    pub fn town_sessions(&self) -> TownSessions<S> {
        let sessions = TownSessions::new(self.sessions.clone(), &self.town_root);
        match self.legacy_fallback {
            Some(enabled) => sessions.with_legacy_fallback(enabled),
            None => sessions,
        }
    }

    /// Manager for `addr`, whose sessions carry the identity env vars so the
    /// agent can resolve its own address.
    pub fn for_agent(&self, addr: &AgentAddress) -> AgentManager<TownSessions<S>> {
        let config = self.defaults.clone().with_env_vars(identity_env(addr));
        AgentManager::new(self.town_sessions(), config)
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
