//! Readiness probing specs

use crate::prelude::*;

#[tokio::test]
async fn zero_timeout_without_checker_is_ready_immediately() {
    let config = AgentConfig::new().with_readiness_timeout(Duration::ZERO);
    let (_, agents) = bare_manager(config);
    let mayor = AgentAddress::mayor();
    agents
        .start(&mayor, Path::new("/tmp"), "claude")
        .await
        .unwrap();

    let started = Instant::now();
    agents.wait_ready(&mayor).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn prompt_checker_sees_prompt() {
    let config = AgentConfig::new()
        .with_process_names(["claude"])
        .with_readiness(PromptChecker::new("> "))
        .with_readiness_timeout(Duration::from_secs(2));
    let (fake, agents) = bare_manager(config);
    let crew = AgentAddress::crew("gastown", "joe").unwrap();
    agents
        .start(&crew, Path::new("/tmp"), "claude")
        .await
        .unwrap();
    fake.set_output("gastown/crew/joe", vec!["Starting up...".to_string()]);

    let typist = fake.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        typist.append_output("gastown/crew/joe", "> ");
    });

    agents.wait_ready(&crew).await.unwrap();
}

#[tokio::test]
async fn readiness_timeout_is_distinct_error() {
    let config = AgentConfig::new()
        .with_readiness(|output: &str| output.contains("READY"))
        .with_readiness_timeout(Duration::from_millis(250));
    let (_, agents) = bare_manager(config);
    let mayor = AgentAddress::mayor();
    agents
        .start(&mayor, Path::new("/tmp"), "claude")
        .await
        .unwrap();

    let err = agents.wait_ready(&mayor).await.unwrap_err();
    assert!(matches!(err, AgentError::Timeout(_)), "{err}");
}

#[tokio::test]
async fn wait_ready_on_missing_session_is_not_running() {
    let (_, agents) = bare_manager(AgentConfig::new());
    let err = agents
        .wait_ready(&AgentAddress::deacon())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NotRunning(_)), "{err}");
}

#[tokio::test]
async fn failed_post_create_callback_cleans_up() {
    let config = AgentConfig::new()
        .with_on_created(|_: &str| -> Result<(), String> { Err("no theme".to_string()) });
    let (fake, agents) = bare_manager(config);

    let err = agents
        .start(&AgentAddress::mayor(), Path::new("/tmp"), "claude")
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Hook { .. }), "{err}");
    assert!(fake.session_names().is_empty());
}
