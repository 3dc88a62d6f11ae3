//! Vote ledger integration tests
//!
//! Run with: cargo test -p integration-tests --test ledger_tests

use futures::future::join_all;

use integration_tests::{students, user, TestEnv};
use study_core::{VoteCounters, VoteType};
use study_db::RetryPolicy;
use study_service::{require_signed_in, ServiceError, VoteAction};

// ============================================================================
// Single-user sequences
// ============================================================================

#[tokio::test]
async fn test_two_user_scenario() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let ledger = env.ledger();
    let (a, b) = (user("user-a"), user("user-b"));

    let outcome = ledger.apply_vote(&target, &a, VoteType::Upvote).await.unwrap();
    assert_eq!((outcome.counters.upvotes, outcome.counters.score), (1, 1));

    let outcome = ledger.apply_vote(&target, &a, VoteType::Upvote).await.unwrap();
    assert_eq!((outcome.counters.upvotes, outcome.counters.score), (0, 0));

    let outcome = ledger.apply_vote(&target, &b, VoteType::Downvote).await.unwrap();
    assert_eq!((outcome.counters.downvotes, outcome.counters.score), (1, -1));

    env.assert_reconciled(&target).await.unwrap();
}

#[tokio::test]
async fn test_repeated_vote_is_net_zero() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let ledger = env.ledger();
    let before = env.counters(&target).await.unwrap();

    for vote in [VoteType::Upvote, VoteType::Downvote] {
        let first = ledger.apply_vote(&target, &user("u1"), vote).await.unwrap();
        let second = ledger.apply_vote(&target, &user("u1"), vote).await.unwrap();

        assert_eq!(first.action, VoteAction::Created);
        assert_eq!(second.action, VoteAction::Retracted);
        assert_eq!(second.counters, before);
    }

    assert_eq!(env.reaction_count(&target).await.unwrap(), 0);
}

#[tokio::test]
async fn test_switch_swings_score_by_two() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let ledger = env.ledger();
    let voter = user("switcher");

    // Another user's vote must be unaffected by the switch
    ledger.apply_vote(&target, &user("bystander"), VoteType::Upvote).await.unwrap();

    let after_up = ledger.apply_vote(&target, &voter, VoteType::Upvote).await.unwrap();
    let after_down = ledger.apply_vote(&target, &voter, VoteType::Downvote).await.unwrap();

    assert_eq!(after_down.action, VoteAction::Switched);
    assert_eq!(after_down.counters.upvotes, after_up.counters.upvotes - 1);
    assert_eq!(after_down.counters.downvotes, after_up.counters.downvotes + 1);
    assert_eq!(after_down.counters.score, after_up.counters.score - 2);
    assert_eq!(
        env.stored_vote(&target, &voter).await.unwrap(),
        Some(VoteType::Downvote)
    );
}

#[tokio::test]
async fn test_invariants_hold_over_long_sequence() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let ledger = env.ledger();
    let voters = students(4);

    // Deterministic pseudo-random walk over (voter, direction)
    let mut seed = 17u32;
    for _ in 0..60 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let voter = &voters[(seed >> 16) as usize % voters.len()];
        let vote = if (seed >> 8) & 1 == 0 {
            VoteType::Upvote
        } else {
            VoteType::Downvote
        };

        let outcome = ledger.apply_vote(&target, voter, vote).await.unwrap();
        assert!(outcome.counters.is_consistent());
        assert!(env.reaction_count(&target).await.unwrap() <= voters.len());
    }

    env.assert_reconciled(&target).await.unwrap();
}

#[tokio::test]
async fn test_answer_votes_are_independent_of_question() {
    let env = TestEnv::new();
    let question = env.seed_question();
    let answer = env.seed_answer(question.target_id());
    let ledger = env.ledger();

    ledger.apply_vote(&answer, &user("u1"), VoteType::Upvote).await.unwrap();
    ledger.apply_vote(&answer, &user("u2"), VoteType::Upvote).await.unwrap();

    assert_eq!(env.counters(&answer).await.unwrap(), VoteCounters::new(2, 0));
    assert_eq!(env.counters(&question).await.unwrap(), VoteCounters::default());
    assert_eq!(env.reaction_count(&question).await.unwrap(), 0);
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_signed_out_caller_is_rejected() {
    let err = require_signed_in(None).unwrap_err();
    assert_eq!(err.error_code(), "UNAUTHENTICATED");
    assert_eq!(err.user_message(), "Please sign in to vote.");
}

#[tokio::test]
async fn test_retry_budget() {
    let env = TestEnv::with_policy(RetryPolicy::immediate(3));
    let target = env.seed_question();
    let ledger = env.ledger();

    env.store.inject_conflicts(2);
    let outcome = ledger.apply_vote(&target, &user("u1"), VoteType::Upvote).await.unwrap();
    assert_eq!(outcome.counters, VoteCounters::new(1, 0));

    env.store.inject_conflicts(3);
    let err = ledger
        .apply_vote(&target, &user("u2"), VoteType::Upvote)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::TransactionFailed { attempts: 3, .. }));

    // The failed vote left nothing behind
    assert_eq!(env.counters(&target).await.unwrap(), VoteCounters::new(1, 0));
    assert_eq!(env.stored_vote(&target, &user("u2")).await.unwrap(), None);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_users_lose_no_updates() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let voters = students(24);

    let tasks = voters.iter().enumerate().map(|(i, voter)| {
        let env = env.clone();
        let target = target.clone();
        let voter = voter.clone();
        let vote = if i % 3 == 0 {
            VoteType::Downvote
        } else {
            VoteType::Upvote
        };
        tokio::spawn(async move { env.ledger().apply_vote(&target, &voter, vote).await })
    });

    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let counters = env.assert_reconciled(&target).await.unwrap();
    assert_eq!(counters, VoteCounters::new(16, 8));
    assert_eq!(env.reaction_count(&target).await.unwrap(), 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_user_serializes() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let voter = user("impatient");

    // Nine taps on the same button: an odd count leaves the vote in place
    let tasks = (0..9).map(|_| {
        let env = env.clone();
        let target = target.clone();
        let voter = voter.clone();
        tokio::spawn(async move {
            env.ledger()
                .apply_vote(&target, &voter, VoteType::Upvote)
                .await
        })
    });

    let actions: Vec<VoteAction> = join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap().unwrap().action)
        .collect();

    let created = actions.iter().filter(|a| **a == VoteAction::Created).count();
    let retracted = actions.iter().filter(|a| **a == VoteAction::Retracted).count();
    assert_eq!(created, 5);
    assert_eq!(retracted, 4);

    assert_eq!(env.assert_reconciled(&target).await.unwrap(), VoteCounters::new(1, 0));
    assert_eq!(env.reaction_count(&target).await.unwrap(), 1);
}

// ============================================================================
// Recount
// ============================================================================

#[tokio::test]
async fn test_recount_after_votes_is_clean() {
    let env = TestEnv::new();
    let target = env.seed_question();
    let ledger = env.ledger();

    for (i, voter) in students(5).iter().enumerate() {
        let vote = if i % 2 == 0 {
            VoteType::Upvote
        } else {
            VoteType::Downvote
        };
        ledger.apply_vote(&target, voter, vote).await.unwrap();
    }

    let report = ledger.recount(&target).await.unwrap();
    assert!(!report.repaired);
    assert_eq!(report.recomputed, VoteCounters::new(3, 2));
    assert_eq!(report.reactions, 5);
}

#[tokio::test]
async fn test_recount_fills_legacy_answer() {
    let env = TestEnv::new();
    let question = env.seed_question();
    let answer = env.seed_answer(question.target_id());

    let report = env.ledger().recount(&answer).await.unwrap();
    assert!(report.repaired);
    assert_eq!(report.recomputed, VoteCounters::default());

    env.assert_reconciled(&answer).await.unwrap();
}
