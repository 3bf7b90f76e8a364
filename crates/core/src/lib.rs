// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-core: addressing and naming for Gas Town agent sessions

pub mod address;
pub mod identity;
pub mod naming;
pub mod session;
pub mod shell;
pub mod town;

pub use address::{AddressError, AgentAddress, Role, Tier};
pub use identity::{identity_env, self_address, self_address_from};
pub use naming::{
    base_name, extract_town_id, from_unique, matches_town, parse_base_name, unique_name, NameError,
};
pub use session::{SessionId, SessionInfo};
pub use shell::{shell_escape, shell_join};
pub use town::TownId;
