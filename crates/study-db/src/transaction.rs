//! Transaction runner with conflict retries
//!
//! `run_transaction` opens a transaction, runs the body against it and
//! commits. Conflicts and transient database errors restart the whole body
//! on a fresh transaction after a jittered exponential backoff, so the body
//! must be safe to re-run from scratch.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use tracing::{error, warn};

use study_common::LedgerConfig;
use study_core::{DocumentStore, DomainError, RepoResult, StoreTransaction};

/// How many times to run a transaction body and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for RetryPolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Upper bound of the wait after the given failed attempt (1-based)
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }

    /// Wait after the given failed attempt, jittered into `[ceiling / 2, ceiling]`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        let millis = ceiling.as_millis() as u64;
        if millis < 2 {
            return ceiling;
        }
        Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
    }
}

/// Run `body` inside a transaction, retrying on conflict
///
/// The body receives the open transaction and must do all its reads before
/// buffering writes. On `Ok` the transaction is committed; on `Err` it is
/// rolled back. Retryable failures (see [`DomainError::is_retryable`]) start
/// over until `policy.max_attempts` is reached, after which the last error is
/// reported as [`DomainError::TransactionFailed`]. Other errors are returned
/// as-is after the first attempt.
pub async fn run_transaction<T, F>(
    store: &dyn DocumentStore,
    policy: &RetryPolicy,
    mut body: F,
) -> RepoResult<T>
where
    T: Send,
    F: for<'t> FnMut(&'t mut dyn StoreTransaction) -> BoxFuture<'t, RepoResult<T>> + Send,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let err = match attempt_once(store, &mut body).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() {
            return Err(err);
        }

        if attempt >= policy.max_attempts {
            error!(attempts = attempt, error = %err, "Transaction retries exhausted");
            return Err(DomainError::TransactionFailed {
                attempts: attempt,
                reason: err.to_string(),
            });
        }

        let delay = policy.backoff(attempt);
        warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transaction failed, retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

async fn attempt_once<T, F>(store: &dyn DocumentStore, body: &mut F) -> RepoResult<T>
where
    F: for<'t> FnMut(&'t mut dyn StoreTransaction) -> BoxFuture<'t, RepoResult<T>> + Send,
{
    let mut tx = store.begin().await?;

    match body(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
