// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Self-identification from environment variables.
//!
//! A spawned agent learns its own address from the variables baked into its
//! start command, without querying the multiplexer.

use crate::address::{AddressError, AgentAddress, Role};

pub const ROLE_VAR: &str = "GT_ROLE";
pub const RIG_VAR: &str = "GT_RIG";
pub const CREW_VAR: &str = "GT_CREW";
pub const POLECAT_VAR: &str = "GT_POLECAT";

/// Resolve the current process's address from the environment.
pub fn self_address() -> Result<AgentAddress, AddressError> {
    self_address_from(|key| std::env::var(key).ok())
}

/// Resolve an address from an arbitrary variable lookup.
///
/// Empty values count as missing.
pub fn self_address_from<F>(lookup: F) -> Result<AgentAddress, AddressError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let require = |key: &str| {
        get(key).ok_or_else(|| AddressError::UnknownRole(format!("{key} is not set")))
    };

    let role_name = require(ROLE_VAR)?;
    let role: Role = role_name.parse()?;
    let addr = match role {
        Role::Mayor => AgentAddress::mayor(),
        Role::Deacon => AgentAddress::deacon(),
        Role::Boot => AgentAddress::boot(),
        Role::Witness => AgentAddress::witness(&require(RIG_VAR)?)?,
        Role::Refinery => AgentAddress::refinery(&require(RIG_VAR)?)?,
        Role::Crew => AgentAddress::crew(&require(RIG_VAR)?, &require(CREW_VAR)?)?,
        Role::Polecat => AgentAddress::polecat(&require(RIG_VAR)?, &require(POLECAT_VAR)?)?,
    };
    Ok(addr)
}

/// Environment variables that make [`self_address_from`] resolve `addr`.
///
/// Returns an empty list for addresses whose role is not recognised.
pub fn identity_env(addr: &AgentAddress) -> Vec<(String, String)> {
    let Some(role) = addr.role() else {
        return Vec::new();
    };
    let mut env = vec![(ROLE_VAR.to_string(), role.to_string())];
    if let Some(rig) = addr.rig() {
        env.push((RIG_VAR.to_string(), rig.to_string()));
    }
    if let Some(worker) = addr.worker() {
        let key = match role {
            Role::Crew => CREW_VAR,
            _ => POLECAT_VAR,
        };
        env.push((key.to_string(), worker.to_string()));
    }
    env
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
