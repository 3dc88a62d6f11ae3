//! Test helpers for integration tests
//!
//! Builds a service context over a shared in-memory store and offers
//! shortcuts for seeding targets and inspecting stored state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use study_common::{LedgerConfig, MatchingConfig};
use study_core::{
    DocumentId, DocumentPath, DocumentStore, TargetRef, UserId, VoteCounters, VoteType,
};
use study_db::{MemoryDocumentStore, RetryPolicy};
use study_service::{PartnerService, ReactionLedger, ServiceContext, ServiceContextBuilder};

use crate::fixtures::{legacy_answer_document, question_document, unique_id, user_documents};

/// Store and service context shared by one test
#[derive(Clone)]
pub struct TestEnv {
    pub store: Arc<MemoryDocumentStore>,
    pub ctx: ServiceContext,
}

impl TestEnv {
    /// Environment with generous, fast retries for contention tests
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy {
            max_attempts: 200,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        })
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::build(policy, MatchingConfig::default())
    }

    pub fn with_matching(matching: MatchingConfig) -> Self {
        Self::build(RetryPolicy::immediate(5), matching)
    }

    fn build(policy: RetryPolicy, matching: MatchingConfig) -> Self {
        let store = MemoryDocumentStore::new_shared();
        let ctx = ServiceContextBuilder::new()
            .store(store.clone())
            .ledger(LedgerConfig::default())
            .matching(matching)
            .retry_policy(policy)
            .build()
            .expect("context with a store always builds");
        Self { store, ctx }
    }

    pub fn ledger(&self) -> ReactionLedger<'_> {
        ReactionLedger::new(&self.ctx)
    }

    pub fn partners(&self) -> PartnerService<'_> {
        PartnerService::new(&self.ctx)
    }

    /// Insert a new question and return its target
    pub fn seed_question(&self) -> TargetRef {
        let target = TargetRef::question(unique_id("question"));
        self.store.insert(
            &target.document_path(self.ctx.questions_collection()),
            question_document("How do enzymes work?"),
        );
        target
    }

    /// Insert an answer without counters under `question`
    pub fn seed_answer(&self, question: &DocumentId) -> TargetRef {
        let target = TargetRef::answer(question.clone(), unique_id("answer"));
        self.store.insert(
            &target.document_path(self.ctx.questions_collection()),
            legacy_answer_document("They lower the activation energy."),
        );
        target
    }

    /// Insert the fixture user profiles
    pub fn seed_users(&self) {
        let collection = self.ctx.matching().users_collection.clone();
        for (id, doc) in user_documents() {
            let path = DocumentPath::new(collection.as_str(), DocumentId::parse(id).unwrap());
            self.store.insert(&path, doc);
        }
    }

    /// Counters currently stored on a target
    pub async fn counters(&self, target: &TargetRef) -> Result<VoteCounters> {
        Ok(self.ledger().counters(target).await?)
    }

    /// Number of reaction documents under a target
    pub async fn reaction_count(&self, target: &TargetRef) -> Result<usize> {
        let collection = target.reactions_collection(self.ctx.questions_collection());
        let reactions = self.store.list(&collection).await?;
        Ok(reactions.len())
    }

    /// Vote direction stored for a user, if any
    pub async fn stored_vote(&self, target: &TargetRef, user: &UserId) -> Result<Option<VoteType>> {
        Ok(self.ledger().current_vote(target, user).await?)
    }

    /// Assert the stored counters equal a replay of the stored reactions
    pub async fn assert_reconciled(&self, target: &TargetRef) -> Result<VoteCounters> {
        let counters = self.counters(target).await?;
        let collection = target.reactions_collection(self.ctx.questions_collection());
        let replayed = VoteCounters::replay(
            self.store
                .list(&collection)
                .await?
                .iter()
                .filter_map(|(_, doc)| study_core::Reaction::stored_vote(doc)),
        );

        anyhow::ensure!(counters.is_consistent(), "score drifted: {counters:?}");
        anyhow::ensure!(
            counters == replayed,
            "counters {counters:?} do not match reactions {replayed:?}"
        );
        let raw = self
            .store
            .get(&target.document_path(self.ctx.questions_collection()))
            .await?
            .context("target vanished")?;
        anyhow::ensure!(
            raw.get(VoteCounters::SCORE_FIELD).and_then(serde_json::Value::as_i64)
                == Some(counters.score),
            "stored score field out of date"
        );
        Ok(counters)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
