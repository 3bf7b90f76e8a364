// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Session drivers and agent lifecycle for Gas Town

pub mod agent;
mod env;
pub mod session;
pub mod subprocess;
pub mod traced;

pub use agent::{
    AgentConfig, AgentError, AgentManager, AgentManagerFactory, PromptChecker, ReadinessChecker,
    SessionHook,
};
pub use session::{
    deliver_nudge, MirrorSessionAdapter, MirrorSource, NudgeTiming, RemoteTmuxAdapter,
    SessionAdapter, SessionError, TmuxAdapter, TownSessions,
};
pub use traced::TracedSession;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSession, FakeSessionAdapter, SessionCall};
