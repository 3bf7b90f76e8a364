//! Reliable message delivery specs

use crate::prelude::*;

#[tokio::test]
async fn nudge_is_recorded_verbatim() {
    let (fake, agents) = bare_manager(AgentConfig::new());
    let witness = AgentAddress::witness("gastown").unwrap();
    agents
        .start(&witness, Path::new("/tmp"), "claude")
        .await
        .unwrap();

    agents
        .nudge(&witness, "HEALTH_CHECK: are you alive?")
        .await
        .unwrap();

    assert_eq!(
        fake.nudges("gastown/witness"),
        vec!["HEALTH_CHECK: are you alive?"]
    );
}

#[tokio::test]
async fn nudges_are_logged_in_submission_order() {
    let (fake, agents) = bare_manager(AgentConfig::new());
    let mayor = AgentAddress::mayor();
    agents
        .start(&mayor, Path::new("/tmp"), "claude")
        .await
        .unwrap();

    for message in ["first", "second", "third"] {
        agents.nudge(&mayor, message).await.unwrap();
    }

    assert_eq!(fake.nudges("mayor"), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn nudge_ends_with_enter() {
    let (fake, agents) = bare_manager(AgentConfig::new());
    let mayor = AgentAddress::mayor();
    agents
        .start(&mayor, Path::new("/tmp"), "claude")
        .await
        .unwrap();

    agents.nudge(&mayor, "check your hook").await.unwrap();

    assert_eq!(fake.control_keys("mayor"), vec!["Escape", "Enter"]);
}

#[tokio::test]
async fn nudge_survives_a_rejected_enter() {
    let (fake, agents) = bare_manager(AgentConfig::new());
    let mayor = AgentAddress::mayor();
    agents
        .start(&mayor, Path::new("/tmp"), "claude")
        .await
        .unwrap();
    fake.fail_control_key("mayor", "Enter", 1);

    agents.nudge(&mayor, "retry me").await.unwrap();

    assert_eq!(fake.nudges("mayor"), vec!["retry me"]);
}

#[tokio::test]
async fn nudge_to_missing_agent_fails() {
    let (_, agents) = bare_manager(AgentConfig::new());
    let err = agents
        .nudge(&AgentAddress::deacon(), "anyone?")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("nudging session:"), "{err}");
}
