mod common;

use anyhow::Result;
use serde_json::json;

use madaris_core::features;

#[tokio::test]
async fn empty_flag_map_enables_every_key() -> Result<()> {
    let mut school = common::school_t1();
    school["feature_flags"] = json!({});
    let (bootstrapper, _) = common::bootstrapper_with(vec![school]);

    let session = bootstrapper.resolve("g1").await.expect("guardian code must resolve");
    let tenant = session.tenant.as_ref().unwrap();

    assert!(features::is_enabled(tenant, "quizzes"));
    assert!(features::is_enabled(tenant, "libraryItems"));
    assert!(features::is_enabled(tenant, "shippedAfterThisTenantWasCreated"));
    Ok(())
}

#[tokio::test]
async fn only_explicit_false_disables() -> Result<()> {
    let mut school = common::school_t1();
    school["feature_flags"] = json!({
        "talkingCards": false,
        "quizzes": true,
        "albumPhotos": null,
        "projects": "yes"
    });
    let (bootstrapper, _) = common::bootstrapper_with(vec![school]);

    let session = bootstrapper.resolve("g1").await.expect("guardian code must resolve");
    let tenant = session.tenant.as_ref().unwrap();

    assert!(!features::is_enabled(tenant, "talkingCards"));
    assert!(features::is_enabled(tenant, "quizzes"));
    // anything other than the literal false enables
    assert!(features::is_enabled(tenant, "albumPhotos"));
    assert!(features::is_enabled(tenant, "projects"));
    // absent key enables
    assert!(features::is_enabled(tenant, "summaries"));
    Ok(())
}

#[tokio::test]
async fn demo_fixture_carries_a_disabled_flag() -> Result<()> {
    let (bootstrapper, _) = common::demo_bootstrapper();

    let session = bootstrapper.resolve("g-yasmine").await.expect("demo guardian resolves");
    let tenant = session.tenant.as_ref().unwrap();

    assert!(!features::is_enabled(tenant, "talkingCards"));
    assert!(features::is_enabled(tenant, "summaries"));
    Ok(())
}
