//! Partner matching integration tests
//!
//! Run with: cargo test -p integration-tests --test matching_tests

use integration_tests::{reference_profiles, user, TestEnv};
use study_common::MatchingConfig;
use study_core::UserProfile;
use study_service::{MatchScorer, ServiceError};

#[test]
fn test_reference_score() {
    let (me, other) = reference_profiles();
    assert_eq!(MatchScorer::score(&me, &other), 23);
    assert_eq!(MatchScorer::score(&me, &other), MatchScorer::score(&me, &other));
}

#[test]
fn test_score_ignores_set_order_and_duplicates() {
    let (me, _) = reference_profiles();
    let shuffled: UserProfile = serde_json::from_value(serde_json::json!({
        "uid": "shuffled",
        "subjects": ["Chemistry", "Math", "Math"],
        "methods": ["Group", "Group"],
        "academicLevel": "A-Level"
    }))
    .unwrap();

    assert_eq!(MatchScorer::score(&me, &shuffled), 23);
}

#[test]
fn test_breakdown_total_matches_score() {
    let (me, other) = reference_profiles();
    let breakdown = MatchScorer::breakdown(&me, &other);

    assert_eq!(breakdown.shared_subjects, 1);
    assert_eq!(breakdown.shared_methods, 1);
    assert_eq!(breakdown.shared_preferences, 0);
    assert!(breakdown.level_match);
    assert_eq!(breakdown.total(), MatchScorer::score(&me, &other));
}

#[tokio::test]
async fn test_find_partners_ranks_stored_profiles() {
    let env = TestEnv::with_matching(MatchingConfig::default());
    env.seed_users();

    let ranked = env.partners().find_partners(&user("tariro")).await.unwrap();
    let ids: Vec<&str> = ranked.iter().map(|c| c.user_id.as_str()).collect();

    // farai: 2 subjects, 1 method, 1 preference, level = 20 + 5 + 3 + 8
    // nyasha: 1 subject, 1 preference = 13; chipo: 1 method = 5; rudo: 0
    assert_eq!(ids, vec!["farai", "nyasha", "chipo", "rudo"]);
    assert_eq!(ranked[0].score, 36);
    assert_eq!(ranked[0].display_name.as_deref(), Some("Farai"));
    assert_eq!(ranked[3].score, 0);
}

#[tokio::test]
async fn test_find_partners_respects_limit() {
    let env = TestEnv::with_matching(MatchingConfig {
        top_n: 1,
        ..MatchingConfig::default()
    });
    env.seed_users();

    let ranked = env.partners().find_partners(&user("chipo")).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].user_id.as_str(), "tariro");
}

#[tokio::test]
async fn test_find_partners_requires_profile() {
    let env = TestEnv::with_matching(MatchingConfig::default());
    env.seed_users();

    let err = env
        .partners()
        .find_partners(&user("stranger"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "Profile", .. }));
    assert_eq!(err.user_message(), "Complete your profile to find partners.");
}
