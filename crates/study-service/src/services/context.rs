//! Service context - dependency container for services
//!
//! Holds the document store and the settings the services read.

use std::sync::Arc;

use study_common::{AppConfig, LedgerConfig, MatchingConfig};
use study_core::DocumentStore;
use study_db::RetryPolicy;

/// Service context containing all dependencies
///
/// Cheap to clone; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn DocumentStore>,
    retry_policy: RetryPolicy,
    questions_collection: String,
    matching: MatchingConfig,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        store: Arc<dyn DocumentStore>,
        ledger: &LedgerConfig,
        matching: MatchingConfig,
    ) -> Self {
        Self {
            store,
            retry_policy: RetryPolicy::from(ledger),
            questions_collection: ledger.questions_collection.clone(),
            matching,
        }
    }

    /// Create a context from the loaded application config
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        Self::new(store, &config.ledger, config.matching.clone())
    }

    /// Get the document store
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get the retry policy for vote transactions
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Root collection of community questions
    pub fn questions_collection(&self) -> &str {
        &self.questions_collection
    }

    /// Partner matching settings
    pub fn matching(&self) -> &MatchingConfig {
        &self.matching
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"DocumentStore")
            .field("retry_policy", &self.retry_policy)
            .field("questions_collection", &self.questions_collection)
            .field("matching", &self.matching)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    ledger: LedgerConfig,
    matching: MatchingConfig,
    retry_policy: Option<RetryPolicy>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn matching(mut self, matching: MatchingConfig) -> Self {
        self.matching = matching;
        self
    }

    /// Override the retry policy derived from the ledger config
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the store is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        let store = self
            .store
            .ok_or_else(|| super::error::ServiceError::validation("store is required"))?;

        let mut ctx = ServiceContext::new(store, &self.ledger, self.matching);
        if let Some(policy) = self.retry_policy {
            ctx.retry_policy = policy;
        }
        Ok(ctx)
    }
}
