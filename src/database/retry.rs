use std::future::Future;
use std::time::Duration;

use crate::error::LeaveError;

/// Bounded linear backoff: attempt `n` (1-based) that fails waits `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// No waiting between attempts. Used by tests and the in-memory store.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Runs `action` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. The last error is returned unchanged.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut action: F,
) -> Result<T, LeaveError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LeaveError>>,
{
    let mut attempt = 1;
    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    operation,
                    attempt,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    log::error!(
                        "{} failed after {} attempts: {}",
                        operation,
                        attempt,
                        err
                    );
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_transient_sqlstate;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn recovers_from_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&RetryPolicy::immediate(3), "flaky", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(LeaveError::StorageError("connection reset".into()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::immediate(3), "down", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LeaveError::StorageError("unreachable".into()))
            })
            .await;

        assert!(matches!(result, Err(LeaveError::StorageError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_logical_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::immediate(3), "decide", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LeaveError::invalid_state("already approved"))
            })
            .await;

        assert!(matches!(result, Err(LeaveError::InvalidState(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn schema_errors_surface_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::immediate(3), "read balance", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LeaveError::from(sqlx::Error::ColumnNotFound(
                    "vacation".to_string(),
                )))
            })
            .await;

        assert!(matches!(result, Err(LeaveError::DatabaseError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pool_timeouts_are_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::immediate(3), "acquire", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LeaveError::from(sqlx::Error::PoolTimedOut))
            })
            .await;

        assert!(matches!(result, Err(LeaveError::StorageError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn sqlx_errors_are_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(LeaveError::from(sqlx::Error::Io(io)).is_transient());
        assert!(LeaveError::from(sqlx::Error::PoolClosed).is_transient());
        assert!(!LeaveError::from(sqlx::Error::RowNotFound).is_transient());
        assert!(!LeaveError::from(sqlx::Error::Decode("bad leave type".into())).is_transient());
    }

    #[test]
    fn only_connection_sqlstates_are_transient() {
        for code in ["08006", "08001", "40001", "40P01", "57P01"] {
            assert!(is_transient_sqlstate(code), "{code}");
        }
        // value too long, check violation, unique violation, undefined column
        for code in ["22001", "23514", "23505", "42703"] {
            assert!(!is_transient_sqlstate(code), "{code}");
        }
    }
}
