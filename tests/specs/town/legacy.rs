//! Legacy un-suffixed session specs

use crate::prelude::*;

#[tokio::test]
async fn optimistic_fallback_reaches_legacy_session() {
    let driver = FakeSessionAdapter::new();
    driver.add_session("hq-mayor", true);
    let sessions = town(&driver, PRODUCTION);

    assert!(sessions.exists("mayor").await.unwrap());
    sessions.stop("mayor").await.unwrap();

    assert!(driver.session_names().is_empty());
}

#[tokio::test]
async fn disabled_fallback_ignores_legacy_session() {
    let driver = FakeSessionAdapter::new();
    driver.add_session("hq-mayor", true);
    let sessions = TownSessions::new(driver.clone(), PRODUCTION).with_legacy_fallback(false);

    assert!(!sessions.exists("mayor").await.unwrap());
    assert!(sessions.list().await.unwrap().is_empty());
    sessions.stop("mayor").await.unwrap();
    assert_eq!(driver.session_names(), vec!["hq-mayor"]);
}

#[tokio::test]
async fn empty_town_root_lists_everything_unsuffixed() {
    let driver = FakeSessionAdapter::new();
    let sessions = town(&driver, "");
    assert_eq!(sessions.town_id(), &TownId::default());

    sessions
        .start("gastown/refinery", Path::new("/tmp"), "claude")
        .await
        .unwrap();
    driver.add_session("gt-other-witness", true);

    assert_eq!(
        driver.session_names(),
        vec!["gt-gastown-refinery", "gt-other-witness"]
    );
    let mut listed: Vec<String> = sessions
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|id| id.into_inner())
        .collect();
    listed.sort();
    assert_eq!(listed, vec!["gastown/refinery", "other/witness"]);
}
