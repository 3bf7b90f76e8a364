//! Cross-town isolation specs
//!
//! Two towns on one host share a driver but never see each other's agents.

use crate::prelude::*;

#[tokio::test]
async fn towns_do_not_see_each_other() {
    let driver = FakeSessionAdapter::new();
    let production_mayor = suffixed("hq-mayor", PRODUCTION);
    let staging_mayor = suffixed("hq-mayor", STAGING);
    assert_ne!(production_mayor, staging_mayor);
    driver.add_session(&production_mayor, true);
    driver.add_session(&staging_mayor, true);

    for (root, ours, theirs) in [
        (PRODUCTION, &production_mayor, &staging_mayor),
        (STAGING, &staging_mayor, &production_mayor),
    ] {
        let sessions = town(&driver, root);
        assert!(sessions.exists("mayor").await.unwrap());

        let listed = sessions.list().await.unwrap();
        assert_eq!(
            listed.iter().filter(|id| id.as_str() == "mayor").count(),
            1,
            "{root}: {listed:?}"
        );
        assert!(!listed.iter().any(|id| id.as_str() == theirs.as_str()));

        assert_eq!(
            sessions.resolve(&AgentAddress::mayor()).await.unwrap().as_ref(),
            Some(ours)
        );
    }
}

#[tokio::test]
async fn legacy_session_is_visible_to_both_towns() {
    let driver = FakeSessionAdapter::new();
    driver.add_session("hq-mayor", true);

    for root in [PRODUCTION, STAGING] {
        let sessions = town(&driver, root);
        assert!(sessions.exists("mayor").await.unwrap(), "{root}");
        let listed = sessions.list().await.unwrap();
        assert!(listed.iter().any(|id| id.as_str() == "mayor"), "{root}");
    }
}

#[tokio::test]
async fn same_agent_started_in_two_towns() {
    let driver = FakeSessionAdapter::new();
    let config = AgentConfig::new().with_process_names(["claude"]);
    let production = AgentManager::new(town(&driver, PRODUCTION), config.clone());
    let staging = AgentManager::new(town(&driver, STAGING), config);
    let polecat = AgentAddress::polecat("gastown", "toast").unwrap();

    production
        .start(&polecat, Path::new("/tmp"), "claude")
        .await
        .unwrap();
    staging
        .start(&polecat, Path::new("/tmp"), "claude")
        .await
        .unwrap();

    assert_eq!(
        driver.session_names(),
        {
            let mut names = vec![
                suffixed("gt-gastown-toast", PRODUCTION),
                suffixed("gt-gastown-toast", STAGING),
            ];
            names.sort();
            names
        }
    );

    production.stop(&polecat, false).await.unwrap();
    assert!(!production.exists(&polecat).await.unwrap());
    assert!(staging.exists(&polecat).await.unwrap());
    assert_eq!(staging.list().await.unwrap(), vec![polecat]);
}
