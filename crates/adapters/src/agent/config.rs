// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration bundle.

use super::readiness::ReadinessChecker;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default time allowed for an agent to become ready.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback run against a session by id.
#[async_trait]
pub trait SessionHook: Send + Sync {
    async fn run(&self, session_id: &str) -> Result<(), String>;
}

#[async_trait]
impl<F> SessionHook for F
where
    F: Fn(&str) -> Result<(), String> + Send + Sync,
{
    async fn run(&self, session_id: &str) -> Result<(), String> {
        self(session_id)
    }
}

/// How an [`AgentManager`](super::AgentManager) starts and probes agents.
#[derive(Clone)]
pub struct AgentConfig {
    /// Detects readiness from pane output; `None` falls back to `startup_delay`
    pub readiness: Option<Arc<dyn ReadinessChecker>>,
    pub startup_delay: Duration,
    pub readiness_timeout: Duration,
    /// Runs before readiness polling (e.g. dismissing a dialog); failures are logged
    pub startup_hook: Option<Arc<dyn SessionHook>>,
    /// Runs right after the session is created; failure stops the session
    pub on_created: Option<Arc<dyn SessionHook>>,
    /// Foreground process names that mark the agent as alive
    pub process_names: Vec<String>,
    /// Prepended to the start command as `KEY=VALUE` words, in key order
    pub env: BTreeMap<String, String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            readiness: None,
            startup_delay: Duration::ZERO,
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            startup_hook: None,
            on_created: None,
            process_names: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("readiness", &self.readiness.is_some())
            .field("startup_delay", &self.startup_delay)
            .field("readiness_timeout", &self.readiness_timeout)
            .field("startup_hook", &self.startup_hook.is_some())
            .field("on_created", &self.on_created.is_some())
            .field("process_names", &self.process_names)
            .field("env", &self.env)
            .finish()
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readiness(mut self, checker: impl ReadinessChecker + 'static) -> Self {
        self.readiness = Some(Arc::new(checker));
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_readiness_timeout(mut self, timeout: Duration) -> Self {
        self.readiness_timeout = timeout;
        self
    }

    pub fn with_startup_hook(mut self, hook: impl SessionHook + 'static) -> Self {
        self.startup_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_on_created(mut self, hook: impl SessionHook + 'static) -> Self {
        self.on_created = Some(Arc::new(hook));
        self
    }

    pub fn with_process_names<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.process_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// `command` with the configured env vars prepended.
    pub fn command_with_env(&self, command: &str) -> String {
        if self.env.is_empty() {
            return command.to_string();
        }
        let mut words: Vec<String> = self.env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        words.push(command.to_string());
        words.join(" ")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
