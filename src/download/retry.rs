//! Retry controller for transient service conditions

use crate::error::VgetError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay schedule for repeated attempts against a remote service
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Wait between ordinary retry attempts
    pub inter_attempt_delay: Duration,
    /// Wait while a server-side conversion job completes
    pub conversion_pending_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            inter_attempt_delay: Duration::from_secs(10),
            conversion_pending_delay: Duration::from_secs(20),
        }
    }
}

/// Classified result of one round of a retried operation
#[derive(Debug)]
pub enum Attempt<T> {
    /// Terminal success value
    Ready(T),
    /// The server reported it is busy
    Busy,
    /// The server-side conversion job has not finished yet
    PendingConversion,
    /// The server answered with a status this client does not know
    Unrecognized(String),
}

/// Run `op` until it yields a value or the policy is exhausted.
///
/// Transient conditions sleep `inter_attempt_delay` before the next round
/// (`conversion_pending_delay` for a pending conversion). Hard faults are
/// logged and retried on the ordinary delay when retryable, and propagated
/// immediately otherwise. The cancellation token is honored before every
/// attempt and during every sleep.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, VgetError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>, VgetError>>,
{
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(VgetError::Interrupted);
        }

        let delay = match op(attempt).await {
            Ok(Attempt::Ready(value)) => return Ok(value),
            Ok(Attempt::Busy) => {
                debug!("attempt {}/{}: server busy", attempt, policy.max_attempts);
                policy.inter_attempt_delay
            }
            Ok(Attempt::PendingConversion) => {
                debug!(
                    "attempt {}/{}: conversion not ready",
                    attempt, policy.max_attempts
                );
                policy.conversion_pending_delay
            }
            Ok(Attempt::Unrecognized(status)) => {
                warn!(
                    "attempt {}/{}: unrecognized status '{}'",
                    attempt, policy.max_attempts, status
                );
                policy.inter_attempt_delay
            }
            Err(e) if e.is_retryable() => {
                warn!(
                    "attempt {}/{} failed: {}",
                    attempt, policy.max_attempts, e
                );
                policy.inter_attempt_delay
            }
            Err(e) => return Err(e),
        };

        if attempt < policy.max_attempts {
            sleep_or_cancel(delay, cancel).await?;
        }
    }

    Err(VgetError::RetriesExhausted(policy.max_attempts))
}

/// Sleep that aborts promptly when the token fires
async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), VgetError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(VgetError::Interrupted),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };
    use std::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            inter_attempt_delay: Duration::from_millis(1),
            conversion_pending_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_always_busy_exhausts_exactly_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(5);
        let cancel = CancellationToken::new();

        let result: Result<(), VgetError> = with_retry(&policy, &cancel, |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Attempt::Busy)
            }
        })
        .await;

        assert!(matches!(result, Err(VgetError::RetriesExhausted(5))));
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_success_on_third_attempt_stops_there() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(5);
        let cancel = CancellationToken::new();

        let result = with_retry(&policy, &cancel, |_| {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 3 {
                    Ok(Attempt::Ready("url".to_string()))
                } else {
                    Ok(Attempt::Busy)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "url");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retryable_fault_is_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(3);
        let cancel = CancellationToken::new();

        let result = with_retry(&policy, &cancel, |_| {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    Err(VgetError::from(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "reset",
                    )))
                } else {
                    Ok(Attempt::Ready(42))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_fault_aborts_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(5);
        let cancel = CancellationToken::new();

        let result: Result<(), VgetError> = with_retry(&policy, &cancel, |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(VgetError::NoQualityMatch)
            }
        })
        .await;

        assert!(matches!(result, Err(VgetError::NoQualityMatch)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_all_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(5);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<(), VgetError> = with_retry(&policy, &cancel, |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Attempt::Busy)
            }
        })
        .await;

        assert!(matches!(result, Err(VgetError::Interrupted)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_during_sleep_aborts_promptly() {
        let policy = RetryPolicy {
            max_attempts: 3,
            inter_attempt_delay: Duration::from_secs(60),
            conversion_pending_delay: Duration::from_secs(60),
        };
        let cancel = CancellationToken::new();

        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel();
            });
        }

        let start = Instant::now();
        let result: Result<(), VgetError> =
            with_retry(&policy, &cancel, |_| async { Ok(Attempt::Busy) }).await;

        assert!(matches!(result, Err(VgetError::Interrupted)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_pending_conversion_uses_longer_delay() {
        let counter = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            max_attempts: 3,
            inter_attempt_delay: Duration::from_millis(1),
            conversion_pending_delay: Duration::from_millis(40),
        };
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let result = with_retry(&policy, &cancel, |_| {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Ok(Attempt::PendingConversion)
                } else {
                    Ok(Attempt::Ready(()))
                }
            }
        })
        .await;

        assert!(result.is_ok());
        // Two pending rounds slept the conversion delay each.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
