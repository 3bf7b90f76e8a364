// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation between logical agent addresses and unique session names.
//!
//! ```text
//! mayor                 -> hq-mayor[-<town>]
//! deacon                -> hq-deacon[-<town>]
//! boot                  -> gt-boot[-<town>]
//! <rig>/witness         -> gt-<rig>-witness[-<town>]
//! <rig>/refinery        -> gt-<rig>-refinery[-<town>]
//! <rig>/polecat/<name>  -> gt-<rig>-<name>[-<town>]
//! <rig>/crew/<name>     -> gt-<rig>-crew-<name>[-<town>]
//! ```
//!
//! Addresses outside this table pass through unchanged (still suffixed).
//! [`AgentAddress::parse`] rejects the addresses that would make this table
//! ambiguous, so the reverse direction can split on the first hyphen after
//! the `gt-` prefix.

use crate::address::{AgentAddress, Role, Tier};
use crate::town::TownId;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Prefix for town-level singleton sessions.
pub const TOWN_PREFIX: &str = "hq-";

/// Prefix for rig sessions (and boot).
pub const RIG_PREFIX: &str = "gt-";

/// Trailing `-<town>` suffix: exactly six lowercase hex characters.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static TOWN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9a-f]{6})$").expect("constant regex pattern is valid"));

/// Errors from reverse name translation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("session {name} belongs to another town ({town_id})")]
    NotOwned { name: String, town_id: String },
    #[error("unrecognised session name: {0}")]
    Unrecognized(String),
}

/// Session name for an address without any town suffix.
pub fn base_name(addr: &AgentAddress) -> String {
    match (addr.tier(), addr.role()) {
        (Tier::Town, Some(Role::Mayor | Role::Deacon)) => {
            format!("{TOWN_PREFIX}{}", addr.role_name())
        }
        (Tier::Town, Some(Role::Boot)) => format!("{RIG_PREFIX}boot"),
        (Tier::Rig, Some(role @ (Role::Witness | Role::Refinery))) => {
            format!("{RIG_PREFIX}{}-{role}", addr.rig().unwrap_or_default())
        }
        (Tier::Worker, Some(Role::Polecat)) => format!(
            "{RIG_PREFIX}{}-{}",
            addr.rig().unwrap_or_default(),
            addr.worker().unwrap_or_default()
        ),
        (Tier::Worker, Some(Role::Crew)) => format!(
            "{RIG_PREFIX}{}-crew-{}",
            addr.rig().unwrap_or_default(),
            addr.worker().unwrap_or_default()
        ),
        _ => addr.as_str().to_string(),
    }
}

/// Unique session name for an address in a town.
///
/// The `-<town>` suffix is appended iff the town id is non-empty.
pub fn unique_name(addr: &AgentAddress, town: &TownId) -> String {
    with_town_suffix(&base_name(addr), town)
}

/// Append `-<town>` to a base name, unless the town id is empty.
pub fn with_town_suffix(base: &str, town: &TownId) -> String {
    match town.to_option() {
        Some(id) => format!("{base}-{id}"),
        None => base.to_string(),
    }
}

/// Extract the trailing `-[0-9a-f]{6}` town suffix, if any.
pub fn extract_town_id(name: &str) -> Option<&str> {
    TOWN_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether a session name is visible to a town.
///
/// An empty town sees everything; un-suffixed legacy names are visible to
/// every town.
pub fn matches_town(name: &str, town: &TownId) -> bool {
    match (town.to_option(), extract_town_id(name)) {
        (None, _) | (_, None) => true,
        (Some(ours), Some(theirs)) => ours == theirs,
    }
}

/// Translate a unique session name back to an address, checking ownership.
///
/// Names carrying another town's suffix are [`NameError::NotOwned`]. In
/// legacy mode (empty town) nothing is stripped.
pub fn from_unique(name: &str, town: &TownId) -> Result<AgentAddress, NameError> {
    let base = match (town.to_option(), extract_town_id(name)) {
        (Some(ours), Some(theirs)) if ours != theirs => {
            return Err(NameError::NotOwned {
                name: name.to_string(),
                town_id: theirs.to_string(),
            });
        }
        (Some(_), Some(_)) => &name[..name.len() - TownId::LEN - 1],
        _ => name,
    };
    parse_base_name(base)
}

/// Invert the naming grammar for an un-suffixed name.
///
/// Names outside the grammar are parsed as addresses verbatim.
pub fn parse_base_name(base: &str) -> Result<AgentAddress, NameError> {
    if let Some(addr) = grammar_address(base) {
        return Ok(addr);
    }
    AgentAddress::parse(base).map_err(|_| NameError::Unrecognized(base.to_string()))
}

/// The address an un-suffixed name spells under the naming grammar, if any.
///
/// Unlike [`parse_base_name`] there is no pass-through: `main` or
/// `test-agent` yield `None`.
pub fn grammar_address(base: &str) -> Option<AgentAddress> {
    if base.contains('/') {
        return None;
    }
    if let Some(role) = base.strip_prefix(TOWN_PREFIX) {
        return match role {
            "mayor" => Some(AgentAddress::mayor()),
            "deacon" => Some(AgentAddress::deacon()),
            _ => None,
        };
    }

    let rest = base.strip_prefix(RIG_PREFIX)?;
    if rest == "boot" {
        return Some(AgentAddress::boot());
    }
    let (rig, tail) = rest.split_once('-')?;
    if rig.is_empty() || tail.is_empty() {
        return None;
    }
    match tail {
        "witness" => AgentAddress::witness(rig).ok(),
        "refinery" => AgentAddress::refinery(rig).ok(),
        _ => match tail.strip_prefix("crew-") {
            Some(name) if !name.is_empty() => AgentAddress::crew(rig, name).ok(),
            _ => AgentAddress::polecat(rig, tail).ok(),
        },
    }
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
