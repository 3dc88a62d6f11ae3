//! Reaction ledger
//!
//! Applies vote intents to questions and answers. The reaction document at
//! `<target>/reactions/{userId}` is the source of truth; the `upvotes`,
//! `downvotes` and `score` fields on the target are a cache that every vote
//! transaction keeps in lockstep with it.

use futures::FutureExt;
use serde::Serialize;
use tracing::{info, instrument, warn};

use study_core::{
    DocumentPath, DomainError, Reaction, RepoResult, StoreTransaction, TargetRef, UserId,
    VoteCounters, VoteType,
};
use study_db::run_transaction;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What a vote did to the caller's reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    /// No reaction existed; one was created
    Created,
    /// Same vote repeated; the reaction was removed
    Retracted,
    /// Opposite vote; the reaction flipped direction
    Switched,
    /// A reaction of another kind was removed; counters untouched
    Cleared,
}

/// Committed result of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub action: VoteAction,
    /// Counters as written by the transaction
    pub counters: VoteCounters,
    /// The caller's vote after the transaction, `None` after a retraction
    /// or a clear
    pub current_vote: Option<VoteType>,
}

/// Result of replaying a target's reactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecountReport {
    pub target: String,
    pub previous: VoteCounters,
    pub recomputed: VoteCounters,
    /// Reactions that counted towards the tallies
    pub reactions: usize,
    /// Reactions with an unrecognised type
    pub ignored: usize,
    /// Whether corrected counters were written
    pub repaired: bool,
}

/// Reject callers without a signed-in user
pub fn require_signed_in(user: Option<UserId>) -> ServiceResult<UserId> {
    user.ok_or(ServiceError::Unauthenticated)
}

/// Vote ledger service
pub struct ReactionLedger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionLedger<'a> {
    /// Create a new ReactionLedger
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply a vote to a question or answer
    ///
    /// Creates, retracts or switches the caller's reaction and rewrites the
    /// target's counters in the same transaction. Conflicts are retried per
    /// the context's retry policy.
    #[instrument(skip(self), fields(target = %target, user_id = %user_id))]
    pub async fn apply_vote(
        &self,
        target: &TargetRef,
        user_id: &UserId,
        vote: VoteType,
    ) -> ServiceResult<VoteOutcome> {
        let root = self.ctx.questions_collection();
        let target_path = target.document_path(root);
        let reaction_path = target.reaction_path(root, user_id);

        let outcome = run_transaction(self.ctx.store(), self.ctx.retry_policy(), |tx| {
            let target = target.clone();
            let user_id = user_id.clone();
            let target_path = target_path.clone();
            let reaction_path = reaction_path.clone();
            async move {
                let paths = VotePaths {
                    target: &target_path,
                    reaction: &reaction_path,
                };
                vote_in_transaction(tx, &target, &user_id, vote, paths).await
            }
            .boxed()
        })
        .await?;

        info!(
            action = ?outcome.action,
            upvotes = outcome.counters.upvotes,
            downvotes = outcome.counters.downvotes,
            score = outcome.counters.score,
            "Vote applied"
        );

        Ok(outcome)
    }

    /// The caller's current vote on a target, for highlighting vote buttons
    ///
    /// Reads outside any transaction, so the answer may be slightly stale.
    #[instrument(skip(self), fields(target = %target, user_id = %user_id))]
    pub async fn current_vote(
        &self,
        target: &TargetRef,
        user_id: &UserId,
    ) -> ServiceResult<Option<VoteType>> {
        let path = target.reaction_path(self.ctx.questions_collection(), user_id);
        let doc = self.ctx.store().get(&path).await?;
        Ok(doc.as_ref().and_then(Reaction::stored_vote))
    }

    /// Current counters of a target
    #[instrument(skip(self), fields(target = %target))]
    pub async fn counters(&self, target: &TargetRef) -> ServiceResult<VoteCounters> {
        let path = target.document_path(self.ctx.questions_collection());
        let doc = self
            .ctx
            .store()
            .get(&path)
            .await?
            .ok_or_else(|| ServiceError::not_found("Target", path.to_string()))?;
        Ok(VoteCounters::from_document(&doc))
    }

    /// Rebuild a target's counters from its reactions
    ///
    /// Writes the recomputed counters only when the stored ones differ,
    /// including a stored `score` that does not match the tallies.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn recount(&self, target: &TargetRef) -> ServiceResult<RecountReport> {
        let root = self.ctx.questions_collection();
        let target_path = target.document_path(root);
        let reactions = target.reactions_collection(root);

        let report = run_transaction(self.ctx.store(), self.ctx.retry_policy(), |tx| {
            let target_path = target_path.clone();
            let reactions = reactions.clone();
            async move { recount_in_transaction(tx, &target_path, &reactions).await }.boxed()
        })
        .await?;

        if report.repaired {
            warn!(
                previous_upvotes = report.previous.upvotes,
                previous_downvotes = report.previous.downvotes,
                previous_score = report.previous.score,
                upvotes = report.recomputed.upvotes,
                downvotes = report.recomputed.downvotes,
                "Repaired drifted counters"
            );
        }

        Ok(report)
    }
}

#[derive(Clone, Copy)]
struct VotePaths<'p> {
    target: &'p DocumentPath,
    reaction: &'p DocumentPath,
}

async fn vote_in_transaction(
    tx: &mut dyn StoreTransaction,
    target: &TargetRef,
    user_id: &UserId,
    vote: VoteType,
    paths: VotePaths<'_>,
) -> RepoResult<VoteOutcome> {
    // Both reads happen before any write is buffered.
    let target_doc = tx
        .get(paths.target)
        .await?
        .ok_or_else(|| DomainError::TargetNotFound(paths.target.to_string()))?;
    let existing = tx.get(paths.reaction).await?;

    let mut counters = VoteCounters::from_document(&target_doc);
    let previous = existing.as_ref().map(Reaction::stored_vote);

    let (action, current_vote) = match previous {
        Some(Some(prev)) if prev == vote => {
            tx.delete(paths.reaction);
            decrement_or_warn(&mut counters, vote);
            (VoteAction::Retracted, None)
        }
        Some(Some(prev)) => {
            let reaction = existing
                .as_ref()
                .and_then(|doc| Reaction::from_document(doc).ok())
                .map(|mut reaction| {
                    reaction.switch_to(vote);
                    reaction
                })
                .unwrap_or_else(|| Reaction::new(target, user_id.clone(), vote));
            tx.set(paths.reaction, reaction.to_document()?);
            decrement_or_warn(&mut counters, prev);
            counters.increment(vote);
            (VoteAction::Switched, Some(vote))
        }
        Some(None) => {
            // Not a vote, so it never counted towards the tallies.
            warn!(path = %paths.reaction, "Clearing reaction of unknown type");
            tx.delete(paths.reaction);
            return Ok(VoteOutcome {
                action: VoteAction::Cleared,
                counters,
                current_vote: None,
            });
        }
        None => {
            let reaction = Reaction::new(target, user_id.clone(), vote);
            tx.set(paths.reaction, reaction.to_document()?);
            counters.increment(vote);
            (VoteAction::Created, Some(vote))
        }
    };

    tx.update(paths.target, counters.to_patch());

    Ok(VoteOutcome {
        action,
        counters,
        current_vote,
    })
}

fn decrement_or_warn(counters: &mut VoteCounters, vote: VoteType) {
    if !counters.decrement(vote) {
        warn!(vote = %vote, "Counter already zero; clamped");
    }
}

async fn recount_in_transaction(
    tx: &mut dyn StoreTransaction,
    target_path: &DocumentPath,
    reactions_collection: &str,
) -> RepoResult<RecountReport> {
    let target_doc = tx
        .get(target_path)
        .await?
        .ok_or_else(|| DomainError::TargetNotFound(target_path.to_string()))?;
    let reactions = tx.list(reactions_collection).await?;

    let stored = VoteCounters::from_document(&target_doc);
    let stored_score = target_doc
        .get(VoteCounters::SCORE_FIELD)
        .and_then(serde_json::Value::as_i64);
    let previous = VoteCounters {
        score: stored_score.unwrap_or(stored.score),
        ..stored
    };

    let votes: Vec<VoteType> = reactions
        .iter()
        .filter_map(|(_, doc)| Reaction::stored_vote(doc))
        .collect();
    let recomputed = VoteCounters::replay(votes.iter().copied());

    let repaired = previous != recomputed || stored_score.is_none();
    if repaired {
        tx.update(target_path, recomputed.to_patch());
    }

    Ok(RecountReport {
        target: target_path.to_string(),
        previous,
        recomputed,
        reactions: votes.len(),
        ignored: reactions.len() - votes.len(),
        repaired,
    })
}
