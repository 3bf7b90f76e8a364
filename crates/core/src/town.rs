// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Town identity and the [`TownId`] newtype.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Six lowercase hex characters derived from a town root path.
///
/// An empty `TownId` represents legacy single-town mode: session names carry
/// no suffix and no ownership filtering applies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TownId(String);

impl TownId {
    /// Number of hex characters in a town id.
    pub const LEN: usize = 6;

    /// Derive the town id for a town root.
    ///
    /// The id is the first 24 bits of SHA-256 over the path exactly as
    /// given; no normalisation, so `/town` and `/town/` are different towns.
    /// An empty path yields the empty id.
    pub fn from_root(root: &Path) -> Self {
        let raw = root.to_string_lossy();
        if raw.is_empty() {
            return Self::default();
        }
        let digest = Sha256::digest(raw.as_bytes());
        let hex: String = digest[..Self::LEN / 2]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        Self(hex)
    }

    /// Wrap an already-derived id, e.g. one extracted from a session name.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Convert to `Option<&str>`, mapping empty to `None`.
    pub fn to_option(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            Some(&self.0)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for TownId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TownId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for TownId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "town_tests.rs"]
mod tests;
