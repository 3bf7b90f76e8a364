//! Agent start, stop, and respawn specs
//!
//! Zombie cleanup, env prepend ordering, and graceful vs forceful stop.

use crate::prelude::*;

#[tokio::test]
async fn zombie_session_is_replaced_on_start() {
    let (fake, agents) = bare_manager(AgentConfig::new().with_process_names(["claude"]));
    fake.add_session("test-agent", false);

    agents
        .start(&addr("test-agent"), Path::new("/tmp"), "new-command")
        .await
        .unwrap();

    let calls = fake.calls();
    let stop = calls
        .iter()
        .position(|c| matches!(c, SessionCall::Stop { id } if id == "test-agent"))
        .unwrap();
    let start = calls
        .iter()
        .position(|c| matches!(c, SessionCall::Start { name, .. } if name == "test-agent"))
        .unwrap();
    assert!(stop < start, "zombie must be gone before the new session: {calls:?}");

    assert!(agents.exists(&addr("test-agent")).await.unwrap());
    assert_eq!(
        fake.start_command("test-agent").as_deref(),
        Some("new-command")
    );
}

#[tokio::test]
async fn live_session_is_not_replaced() {
    let (fake, agents) = bare_manager(AgentConfig::new().with_process_names(["claude"]));
    fake.add_session("test-agent", true);

    let err = agents
        .start(&addr("test-agent"), Path::new("/tmp"), "new-command")
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::AlreadyRunning(_)), "{err}");
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn env_vars_are_prepended_in_key_order() {
    let config = AgentConfig::new()
        .with_env("ZZZ", "last")
        .with_env("AAA", "first")
        .with_env("MMM", "middle");
    let (fake, agents) = bare_manager(config);

    agents
        .start(&addr("test-agent"), Path::new("/tmp"), "echo hello")
        .await
        .unwrap();

    similar_asserts::assert_eq!(
        fake.start_command("test-agent").as_deref(),
        Some("AAA=first MMM=middle ZZZ=last echo hello")
    );
}

#[tokio::test]
async fn empty_env_leaves_command_untouched() {
    let (fake, agents) = bare_manager(AgentConfig::new());

    agents
        .start(&addr("test-agent"), Path::new("/tmp"), "echo hello")
        .await
        .unwrap();

    assert_eq!(
        fake.start_command("test-agent").as_deref(),
        Some("echo hello")
    );
}

#[tokio::test]
async fn graceful_and_forceful_stop() {
    let (fake, agents) = bare_manager(AgentConfig::new().with_process_names(["claude"]));
    let agent1 = addr("agent1");
    let agent2 = addr("agent2");
    agents.start(&agent1, Path::new("/tmp"), "claude").await.unwrap();
    agents.start(&agent2, Path::new("/tmp"), "claude").await.unwrap();

    agents.stop(&agent1, false).await.unwrap();
    assert!(fake.control_keys("agent1").is_empty());
    assert!(!fake.exists("agent1").await.unwrap());

    let control_before_stop = fake.calls().len();
    let started = Instant::now();
    agents.stop(&agent2, true).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(
        fake.calls()[control_before_stop],
        SessionCall::SendControl {
            id: "agent2".to_string(),
            key: "C-c".to_string(),
        }
    );
    assert!(!fake.exists("agent2").await.unwrap());
    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
}

#[tokio::test]
async fn respawn_restarts_in_place() {
    let config = AgentConfig::new()
        .with_process_names(["claude"])
        .with_env("GT_ROLE", "mayor");
    let (fake, agents) = bare_manager(config);
    let mayor = AgentAddress::mayor();
    agents
        .start(&mayor, Path::new("/tmp"), "claude --continue")
        .await
        .unwrap();
    fake.set_alive("mayor", false);
    assert!(!agents.exists(&mayor).await.unwrap());

    agents.respawn(&mayor).await.unwrap();

    assert!(agents.exists(&mayor).await.unwrap());
    assert_eq!(
        fake.start_command("mayor").as_deref(),
        Some("GT_ROLE=mayor claude --continue")
    );
}
