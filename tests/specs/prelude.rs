//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

pub use gt_adapters::{
    AgentConfig, AgentError, AgentManager, FakeSessionAdapter, PromptChecker, SessionAdapter,
    SessionCall, TownSessions,
};
pub use gt_core::{AgentAddress, TownId};
pub use std::path::Path;
pub use std::time::{Duration, Instant};

pub const PRODUCTION: &str = "/home/user/production";
pub const STAGING: &str = "/home/user/staging";

/// Agent manager driving the in-memory double directly (no town layer).
pub fn bare_manager(config: AgentConfig) -> (FakeSessionAdapter, AgentManager<FakeSessionAdapter>) {
    let fake = FakeSessionAdapter::new();
    (fake.clone(), AgentManager::new(fake, config))
}

/// Town wrapper over a shared driver, legacy fallback on.
pub fn town(driver: &FakeSessionAdapter, root: &str) -> TownSessions<FakeSessionAdapter> {
    TownSessions::new(driver.clone(), root).with_legacy_fallback(true)
}

pub fn addr(s: &str) -> AgentAddress {
    AgentAddress::parse(s).unwrap()
}

/// Unique name of `base` in the town rooted at `root`.
pub fn suffixed(base: &str, root: &str) -> String {
    format!("{base}-{}", TownId::from_root(Path::new(root)))
}
