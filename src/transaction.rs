//! A retrying transaction executor.
//!
//! [`RetryingTransactionHelper`] is the bundled [`TransactionExecutor`]. It
//! keeps a stack of active transactions per calling thread, joins the
//! active transaction when asked to, and retries work that fails with a
//! concurrency conflict.

use std::collections::HashMap;
use std::sync::Mutex;
use std::thread::{self, ThreadId};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransactionError};
use crate::services::{TransactionExecutor, TransactionWork};

/// Retry and backoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of attempts; at least one attempt is always made
    pub max_retries: u32,
    /// Wait before the first retry
    pub min_retry_wait_ms: u64,
    /// Upper bound for any wait
    pub max_retry_wait_ms: u64,
    /// Amount added to the wait for every further retry
    pub retry_wait_increment_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 20,
            min_retry_wait_ms: 100,
            max_retry_wait_ms: 2000,
            retry_wait_increment_ms: 100,
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1-based).
    pub fn wait_before(&self, retry: u32) -> Duration {
        let steps = u64::from(retry.saturating_sub(1));
        let grown = self
            .min_retry_wait_ms
            .saturating_add(self.retry_wait_increment_ms.saturating_mul(steps));
        Duration::from_millis(grown.min(self.max_retry_wait_ms))
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

#[derive(Debug)]
struct ActiveTxn {
    id: String,
    read_only: bool,
}

/// Transaction executor that retries concurrency conflicts.
///
/// # Examples
///
/// ```
/// use webscript_container::{RetryPolicy, RetryingTransactionHelper, TransactionExecutor};
///
/// let helper = RetryingTransactionHelper::new(RetryPolicy::default());
/// let mut seen = None;
/// helper
///     .do_in_transaction(&mut || {
///         seen = helper.current_transaction_id();
///         Ok(())
///     })
///     .unwrap();
/// assert!(seen.is_some());
/// assert!(helper.current_transaction_id().is_none());
/// ```
#[derive(Debug, Default)]
pub struct RetryingTransactionHelper {
    policy: RetryPolicy,
    active: Mutex<HashMap<ThreadId, Vec<ActiveTxn>>>,
}

impl RetryingTransactionHelper {
    /// Creates a helper with the given retry policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// The retry policy in force.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns `true` if the calling thread's active transaction is read-only.
    pub fn is_read_only(&self) -> bool {
        self.with_stack(|stack| stack.last().map(|t| t.read_only).unwrap_or(false))
    }

    fn with_stack<R>(&self, f: impl FnOnce(&mut Vec<ActiveTxn>) -> R) -> R {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let key = thread::current().id();
        let stack = active.entry(key).or_default();
        let result = f(stack);
        if stack.is_empty() {
            active.remove(&key);
        }
        result
    }

    fn begin(&self, read_only: bool) -> TxnScope<'_> {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(txn = %id, read_only, "Begin transaction");
        self.with_stack(|stack| stack.push(ActiveTxn { id, read_only }));
        TxnScope { helper: self }
    }

    fn run(
        &self,
        work: &mut TransactionWork<'_>,
        read_only: bool,
        requires_new: bool,
    ) -> Result<()> {
        if !requires_new && self.current_transaction_id().is_some() {
            // Joined work runs once; the outermost transaction owns the retries.
            return work();
        }

        let attempts = self.policy.attempts();
        let mut attempt = 1;
        loop {
            let result = {
                let _txn = self.begin(read_only);
                work()
            };
            match result {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let wait = self.policy.wait_before(attempt);
                    tracing::warn!(
                        attempt,
                        max = attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Transaction conflict, retrying"
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(attempts, error = %e, "Transaction retries exhausted");
                    return Err(TransactionError::RetriesExhausted {
                        attempts,
                        last: e.to_string(),
                    }
                    .into());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Ends the innermost transaction of the calling thread on drop.
struct TxnScope<'a> {
    helper: &'a RetryingTransactionHelper,
}

impl Drop for TxnScope<'_> {
    fn drop(&mut self) {
        if let Some(txn) = self.helper.with_stack(|stack| stack.pop()) {
            tracing::debug!(txn = %txn.id, "End transaction");
        }
    }
}

impl TransactionExecutor for RetryingTransactionHelper {
    fn do_in_transaction(&self, work: &mut TransactionWork<'_>) -> Result<()> {
        self.run(work, false, false)
    }

    fn do_in_transaction_with(
        &self,
        work: &mut TransactionWork<'_>,
        read_only: bool,
        requires_new: bool,
    ) -> Result<()> {
        self.run(work, read_only, requires_new)
    }

    fn current_transaction_id(&self) -> Option<String> {
        self.with_stack(|stack| stack.last().map(|t| t.id.clone()))
    }
}
