// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Town-aware session addressing.
//!
//! Callers speak logical agent addresses (`mayor`, `gastown/polecat/max`);
//! the wrapped driver sees unique names (`hq-mayor-2c60b7`). Legacy
//! un-suffixed sessions stay reachable while the fallback is enabled.

use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use gt_core::naming::{base_name, from_unique, grammar_address, unique_name, NameError};
use gt_core::{extract_town_id, AgentAddress, SessionId, SessionInfo, TownId};
use std::collections::HashSet;
use std::path::Path;

/// Session driver keyed by logical agent address.
#[derive(Clone)]
pub struct TownSessions<S> {
    inner: S,
    town: TownId,
    legacy_fallback: bool,
}

impl<S: SessionAdapter> TownSessions<S> {
    /// Wrap `inner` for the town rooted at `town_root`. An empty root is
    /// legacy single-town mode.
    pub fn new(inner: S, town_root: impl AsRef<Path>) -> Self {
        Self {
            inner,
            town: TownId::from_root(town_root.as_ref()),
            legacy_fallback: crate::env::legacy_sessions_enabled(),
        }
    }

    /// Whether un-suffixed legacy sessions are resolved and listed.
    pub fn with_legacy_fallback(mut self, enabled: bool) -> Self {
        self.legacy_fallback = enabled;
        self
    }

    pub fn town_id(&self) -> &TownId {
        &self.town
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unique driver-level name for an address in this town.
    pub fn unique_name_for(&self, addr: &AgentAddress) -> String {
        unique_name(addr, &self.town)
    }

    /// The driver-level name currently backing `addr`, if any.
    ///
    /// Tries the suffixed name first, then the legacy base name. Only
    /// addresses the naming grammar covers have a legacy name.
    pub async fn resolve(&self, addr: &AgentAddress) -> Result<Option<String>, SessionError> {
        let unique = self.unique_name_for(addr);
        if self.inner.exists(&unique).await? {
            return Ok(Some(unique));
        }
        if self.legacy_fallback && self.town.to_option().is_some() {
            let legacy = base_name(addr);
            let has_legacy_name = grammar_address(&legacy).as_ref() == Some(addr);
            if has_legacy_name && self.inner.exists(&legacy).await? {
                tracing::debug!(address = %addr, session = %legacy, "resolved legacy session");
                return Ok(Some(legacy));
            }
        }
        Ok(None)
    }

    async fn resolve_id(&self, id: &str) -> Result<Option<String>, SessionError> {
        self.resolve(&parse_logical(id)?).await
    }

    /// Resolve or fail with `NotFound`.
    async fn require(&self, id: &str) -> Result<String, SessionError> {
        self.resolve_id(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn owned(&self, name: &str) -> Option<AgentAddress> {
        let legacy = extract_town_id(name).is_none();
        if legacy && self.town.to_option().is_some() {
            // Un-suffixed names are agents only when they spell one.
            return if self.legacy_fallback {
                grammar_address(name)
            } else {
                None
            };
        }
        match from_unique(name, &self.town) {
            Ok(addr) => Some(addr),
            Err(NameError::NotOwned { .. }) => None,
            Err(e) => {
                tracing::debug!(session = name, error = %e, "skipping session");
                None
            }
        }
    }
}

fn parse_logical(id: &str) -> Result<AgentAddress, SessionError> {
    AgentAddress::parse(id).map_err(|e| SessionError::Invalid(e.to_string()))
}

#[async_trait]
impl<S: SessionAdapter> SessionAdapter for TownSessions<S> {
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError> {
        let addr = parse_logical(name)?;
        self.inner
            .start(&self.unique_name_for(&addr), work_dir, command)
            .await?;
        Ok(SessionId::new(addr.as_str()))
    }

    async fn stop(&self, id: &str) -> Result<(), SessionError> {
        match self.resolve_id(id).await? {
            Some(name) => self.inner.stop(&name).await,
            None => Ok(()),
        }
    }

    async fn respawn(&self, id: &str, command: &str) -> Result<(), SessionError> {
        match self.resolve_id(id).await? {
            Some(name) => self.inner.respawn(&name, command).await,
            None => Err(SessionError::NotRunning(id.to_string())),
        }
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        Ok(self.resolve_id(id).await?.is_some())
    }

    async fn send(&self, id: &str, text: &str) -> Result<(), SessionError> {
        let name = self.require(id).await?;
        self.inner.send(&name, text).await
    }

    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError> {
        let name = self.require(id).await?;
        self.inner.send_literal(&name, text).await
    }

    async fn send_control(&self, id: &str, key: &str) -> Result<(), SessionError> {
        let name = self.require(id).await?;
        self.inner.send_control(&name, key).await
    }

    async fn nudge(&self, id: &str, message: &str) -> Result<(), SessionError> {
        let name = self.require(id).await?;
        self.inner.nudge(&name, message).await
    }

    async fn capture(&self, id: &str, lines: u32) -> Result<String, SessionError> {
        let name = self.require(id).await?;
        self.inner.capture(&name, lines).await
    }

    async fn capture_all(&self, id: &str) -> Result<String, SessionError> {
        let name = self.require(id).await?;
        self.inner.capture_all(&name).await
    }

    async fn is_running(&self, id: &str, process_names: &[String]) -> bool {
        match self.resolve_id(id).await {
            Ok(Some(name)) => self.inner.is_running(&name, process_names).await,
            _ => false,
        }
    }

    async fn list(&self) -> Result<Vec<SessionId>, SessionError> {
        let mut seen = HashSet::new();
        Ok(self
            .inner
            .list()
            .await?
            .iter()
            .filter_map(|name| self.owned(name.as_str()))
            .filter(|addr| seen.insert(addr.as_str().to_string()))
            .map(|addr| SessionId::new(addr.as_str()))
            .collect())
    }

    async fn get_info(&self, id: &str) -> Result<SessionInfo, SessionError> {
        let name = self.require(id).await?;
        let mut info = self.inner.get_info(&name).await?;
        info.name = id.to_string();
        Ok(info)
    }

    async fn get_start_command(&self, id: &str) -> Result<String, SessionError> {
        let name = self.require(id).await?;
        self.inner.get_start_command(&name).await
    }

    async fn attach(&self, id: &str) -> Result<(), SessionError> {
        let name = self.require(id).await?;
        self.inner.attach(&name).await
    }

    async fn switch_to(&self, id: &str) -> Result<(), SessionError> {
        let name = self.require(id).await?;
        self.inner.switch_to(&name).await
    }
}

#[cfg(test)]
#[path = "town_tests.rs"]
mod tests;
