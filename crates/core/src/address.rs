// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hierarchical agent addresses.
//!
//! An [`AgentAddress`] names an agent logically, independent of any session
//! name. Three tiers exist:
//!
//! ```text
//! role              town-level singleton   (mayor, deacon, boot)
//! rig/role          rig-level singleton    (myrig/witness, myrig/refinery)
//! rig/role/worker   named worker           (myrig/polecat/toast, myrig/crew/max)
//! ```
//!
//! Parsing validates structure and rejects addresses whose session name would
//! collide with another agent's: rig names containing `-`, polecats named
//! `witness`/`refinery` or `crew-*`, and single-segment names that spell a
//! known session name (e.g. `hq-mayor`). Unrecognised role names are
//! otherwise accepted so callers can address agents the naming layer passes
//! through unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from address parsing and self-identification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address: {0}")]
    Invalid(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Known agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mayor,
    Deacon,
    Boot,
    Witness,
    Refinery,
    Crew,
    Polecat,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mayor => "mayor",
            Role::Deacon => "deacon",
            Role::Boot => "boot",
            Role::Witness => "witness",
            Role::Refinery => "refinery",
            Role::Crew => "crew",
            Role::Polecat => "polecat",
        }
    }

    /// Whether addresses of this role live under a rig.
    pub fn is_rig_scoped(&self) -> bool {
        !matches!(self, Role::Mayor | Role::Deacon | Role::Boot)
    }

    /// Whether addresses of this role carry a worker name.
    pub fn is_named(&self) -> bool {
        matches!(self, Role::Crew | Role::Polecat)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mayor" => Ok(Role::Mayor),
            "deacon" => Ok(Role::Deacon),
            "boot" => Ok(Role::Boot),
            "witness" => Ok(Role::Witness),
            "refinery" => Ok(Role::Refinery),
            "crew" => Ok(Role::Crew),
            "polecat" => Ok(Role::Polecat),
            other => Err(AddressError::UnknownRole(other.to_string())),
        }
    }
}

/// Address tier, determined by the number of `/`-separated segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Town,
    Rig,
    Worker,
}

fn invalid(s: &str, why: &str) -> AddressError {
    AddressError::Invalid(format!("{s}: {why}"))
}

/// Polecat names that would render as a witness, refinery or crew session.
fn is_reserved_polecat_name(name: &str) -> bool {
    matches!(name, "witness" | "refinery") || name.starts_with("crew-")
}

/// Logical, hierarchical agent address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentAddress(String);

impl AgentAddress {
    /// Parse an address, validating its structure.
    ///
    /// Between one and three non-empty segments are accepted, subject to the
    /// collision rules in the module docs.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let segments: Vec<&str> = s.split('/').collect();
        if segments.len() > 3 {
            return Err(invalid(s, &format!("too many segments ({})", segments.len())));
        }
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(invalid(s, "empty segment"));
        }
        match segments.as_slice() {
            [single] => {
                let spells_known_name = single.parse::<Role>().is_err()
                    && crate::naming::grammar_address(single).is_some();
                if spells_known_name {
                    return Err(invalid(s, "spells another agent's session name"));
                }
            }
            [rig, role, rest @ ..] => {
                if let Ok(role) = role.parse::<Role>() {
                    if rig.contains('-') {
                        return Err(invalid(s, "rig names may not contain '-'"));
                    }
                    if let (Role::Polecat, [worker]) = (role, rest) {
                        if is_reserved_polecat_name(worker) {
                            return Err(invalid(s, "polecat name collides with a rig session"));
                        }
                    }
                }
            }
            [] => {}
        }
        Ok(Self(s.to_string()))
    }

    pub fn mayor() -> Self {
        Self(Role::Mayor.as_str().to_string())
    }

    pub fn deacon() -> Self {
        Self(Role::Deacon.as_str().to_string())
    }

    pub fn boot() -> Self {
        Self(Role::Boot.as_str().to_string())
    }

    pub fn witness(rig: &str) -> Result<Self, AddressError> {
        Self::build(rig, Role::Witness, None)
    }

    pub fn refinery(rig: &str) -> Result<Self, AddressError> {
        Self::build(rig, Role::Refinery, None)
    }

    pub fn polecat(rig: &str, name: &str) -> Result<Self, AddressError> {
        Self::build(rig, Role::Polecat, Some(name))
    }

    pub fn crew(rig: &str, name: &str) -> Result<Self, AddressError> {
        Self::build(rig, Role::Crew, Some(name))
    }

    fn build(rig: &str, role: Role, worker: Option<&str>) -> Result<Self, AddressError> {
        let raw = match worker {
            Some(name) => format!("{rig}/{role}/{name}"),
            None => format!("{rig}/{role}"),
        };
        if rig.contains('/') || worker.is_some_and(|name| name.contains('/')) {
            return Err(invalid(&raw, "segments may not contain '/'"));
        }
        Self::parse(&raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tier(&self) -> Tier {
        match self.0.matches('/').count() {
            0 => Tier::Town,
            1 => Tier::Rig,
            _ => Tier::Worker,
        }
    }

    /// The rig segment, for rig- and worker-tier addresses.
    pub fn rig(&self) -> Option<&str> {
        match self.tier() {
            Tier::Town => None,
            _ => self.0.split('/').next(),
        }
    }

    /// The raw role segment (which may not be a known [`Role`]).
    pub fn role_name(&self) -> &str {
        let mut segments = self.0.split('/');
        match self.tier() {
            Tier::Town => segments.next().unwrap_or_default(),
            _ => segments.nth(1).unwrap_or_default(),
        }
    }

    /// The role, when the role segment names a known one.
    pub fn role(&self) -> Option<Role> {
        self.role_name().parse().ok()
    }

    /// The worker name, for worker-tier addresses.
    pub fn worker(&self) -> Option<&str> {
        match self.tier() {
            Tier::Worker => self.0.split('/').nth(2),
            _ => None,
        }
    }
}

impl fmt::Display for AgentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AgentAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AgentAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for AgentAddress {
    type Error = AddressError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AgentAddress> for String {
    fn from(addr: AgentAddress) -> Self {
        addr.0
    }
}

impl AsRef<str> for AgentAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AgentAddress {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentAddress {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
