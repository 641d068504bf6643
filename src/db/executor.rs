use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::store::{ConnectionSource, Query, Row},
    error::{AppError, AppResult, StoreError},
};

/// Bounded retry budget with a fixed inter-attempt delay
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A budget of zero is treated as a single attempt
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs parameterized queries with bounded retry
///
/// Every attempt acquires its own connection from the source and drops it
/// before the next attempt starts or the result is returned, so nothing is
/// held across attempts or shared between concurrent requests.
#[derive(Clone)]
pub struct QueryExecutor {
    source: Arc<dyn ConnectionSource>,
    policy: RetryPolicy,
}

impl QueryExecutor {
    pub fn new(source: Arc<dyn ConnectionSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Executes the query to completion and returns the full row set
    ///
    /// Transient failures are retried until the budget runs out; anything
    /// else fails on the spot. Either way the caller gets no partial rows.
    pub async fn fetch_all(&self, query: &Query) -> AppResult<Vec<Row>> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.attempt(query).await {
                Ok(rows) => {
                    if attempt > 1 {
                        tracing::info!(
                            operation = query.operation,
                            attempt,
                            "Query succeeded after retry"
                        );
                    }
                    tracing::debug!(
                        operation = query.operation,
                        rows = rows.len(),
                        "Query completed"
                    );
                    return Ok(rows);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        operation = query.operation,
                        source = self.source.name(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Transient database error, retrying"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        operation = query.operation,
                        source = self.source.name(),
                        attempt,
                        max_attempts,
                        transient = e.is_transient(),
                        error = %e,
                        "Database error, giving up"
                    );
                    return Err(AppError::DataAccess {
                        operation: query.operation,
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    async fn attempt(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut conn = self.source.acquire().await?;
        let result = conn.fetch_all(query).await;
        drop(conn);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::StoreConnection;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails the first `failures` statements with the given error, then succeeds
    struct FlakySource {
        failures: Mutex<Vec<StoreError>>,
        opened: Arc<AtomicU32>,
        closed: Arc<AtomicU32>,
    }

    struct FlakyConnection {
        failure: Option<StoreError>,
        closed: Arc<AtomicU32>,
    }

    impl Drop for FlakyConnection {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl StoreConnection for FlakyConnection {
        async fn fetch_all(&mut self, _query: &Query) -> Result<Vec<Row>, StoreError> {
            match self.failure.take() {
                Some(e) => Err(e),
                None => Ok(vec![Row::new().with("category", "Seminar")]),
            }
        }
    }

    #[async_trait::async_trait]
    impl ConnectionSource for FlakySource {
        async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let mut failures = self.failures.lock().unwrap();
            let failure = if failures.is_empty() {
                None
            } else {
                Some(failures.remove(0))
            };
            Ok(Box::new(FlakyConnection {
                failure,
                closed: self.closed.clone(),
            }))
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn executor_with(failures: Vec<StoreError>) -> (QueryExecutor, Arc<AtomicU32>, Arc<AtomicU32>) {
        let opened = Arc::new(AtomicU32::new(0));
        let closed = Arc::new(AtomicU32::new(0));
        let source = FlakySource {
            failures: Mutex::new(failures),
            opened: opened.clone(),
            closed: closed.clone(),
        };
        let executor = QueryExecutor::new(
            Arc::new(source),
            RetryPolicy::new(3, Duration::from_millis(5)),
        );
        (executor, opened, closed)
    }

    fn query() -> Query {
        Query::new("test_query", "SELECT category FROM activities")
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let (executor, opened, closed) = executor_with(vec![]);

        let rows = tokio_test::assert_ok!(executor.fetch_all(&query()).await);

        assert_eq!(rows.len(), 1);
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures_without_leaking() {
        for k in 1..3 {
            let failures = (0..k)
                .map(|i| StoreError::Transient(format!("hiccup {}", i)))
                .collect();
            let (executor, opened, closed) = executor_with(failures);

            let rows = executor.fetch_all(&query()).await.unwrap();

            assert_eq!(rows[0].text("category").unwrap(), "Seminar");
            assert_eq!(opened.load(Ordering::SeqCst), k + 1);
            assert_eq!(opened.load(Ordering::SeqCst), closed.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn test_exhausted_budget_fails_with_data_access_error() {
        let failures = (0..3)
            .map(|_| StoreError::Transient("connection refused".into()))
            .collect();
        let (executor, opened, closed) = executor_with(failures);

        let result = executor.fetch_all(&query()).await;

        match result {
            Err(AppError::DataAccess {
                operation,
                attempts,
                source,
            }) => {
                assert_eq!(operation, "test_query");
                assert_eq!(attempts, 3);
                assert!(source.is_transient());
            }
            other => panic!("expected DataAccess error, got {:?}", other),
        }
        assert_eq!(opened.load(Ordering::SeqCst), 3);
        assert_eq!(closed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let (executor, opened, closed) =
            executor_with(vec![StoreError::Permanent("syntax error".into())]);

        let error = tokio_test::assert_err!(executor.fetch_all(&query()).await);

        assert!(matches!(error, AppError::DataAccess { attempts: 1, .. }));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waits_between_attempts() {
        let (executor, _, _) = executor_with(vec![
            StoreError::Transient("a".into()),
            StoreError::Transient("b".into()),
        ]);

        let start = std::time::Instant::now();
        executor.fetch_all(&query()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_zero_budget_means_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }
}
