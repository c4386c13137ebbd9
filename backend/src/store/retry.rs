//! Timeout and retry around any [`LedgerStore`]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::{Collection, Record};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::{LedgerStore, StoreError, StoreResult};
use crate::config::PersistenceConfig;

/// How long one attempt may take and how often to try
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Factor to multiply delay by after each attempt
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&PersistenceConfig::default())
    }
}

impl From<&PersistenceConfig> for RetryPolicy {
    fn from(config: &PersistenceConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_attempts: config.max_attempts.max(1),
            initial_delay: config.initial_backoff(),
            max_delay: config.max_backoff(),
            backoff_factor: 2.0,
        }
    }
}

/// Wraps a store so each call gets a deadline and transient failures are retried.
///
/// Retrying `insert` is safe because every backend ignores an id it already holds.
pub struct RetryingStore {
    inner: Arc<dyn LedgerStore>,
    policy: RetryPolicy,
}

impl RetryingStore {
    pub fn new(inner: Arc<dyn LedgerStore>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn run<F, Fut, T>(&self, operation: &str, mut call: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut delay = self.policy.initial_delay;
        let mut attempts = 0;

        loop {
            attempts += 1;

            let result = match timeout(self.policy.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout {
                    operation: operation.to_string(),
                    timeout_ms: self.policy.timeout.as_millis() as u64,
                }),
            };

            match result {
                Ok(value) => {
                    if attempts > 1 {
                        debug!("{} succeeded after {} attempts", operation, attempts);
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempts >= self.policy.max_attempts || !error.is_transient() {
                        warn!("{} failed after {} attempts: {}", operation, attempts, error);
                        return Err(error);
                    }

                    warn!(
                        "{} attempt {} failed: {}. Retrying in {:?}...",
                        operation, attempts, error, delay
                    );
                    sleep(delay).await;

                    delay = Duration::from_secs_f64(
                        (delay.as_secs_f64() * self.policy.backoff_factor)
                            .min(self.policy.max_delay.as_secs_f64()),
                    );
                }
            }
        }
    }
}

#[async_trait]
impl LedgerStore for RetryingStore {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        self.run("list_all", || self.inner.list_all(collection)).await
    }

    async fn insert(&self, record: &Record) -> StoreResult<()> {
        self.run("insert", || self.inner.insert(record)).await
    }

    async fn replace_all(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        self.run("replace_all", || self.inner.replace_all(collection, records))
            .await
    }

    async fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.run("clear", || self.inner.clear(collection)).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.run("ping", || self.inner.ping()).await
    }
}
