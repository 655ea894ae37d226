//! Retry/backoff policy for single remote calls
//!
//! Wraps one remote call, not a whole pagination walk: a walk may make
//! partial progress before one of its page fetches surfaces a failure.
//!
//! | Outcome | Action |
//! |---------|--------|
//! | Success | Return the value |
//! | Transient (429/503) | Wait (server hint clamped to [min, max], else default), retry once |
//! | Second transient | Surface the error to the caller |
//! | Not found (404) | Return `Ok(None)`: "absent", not an error |
//! | Anything else | Surface immediately |

use crate::{Result, TideError};
use std::future::Future;
use std::time::Duration;

/// Bounded retry policy with a clamp window for server-provided wait hints.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Lower clamp for server-provided wait hints.
    pub min_wait: Duration,

    /// Upper clamp for server-provided wait hints.
    pub max_wait: Duration,

    /// Wait used when the server provides no hint.
    pub default_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_wait: Duration::from_secs(2),
            max_wait: Duration::from_secs(15),
            default_wait: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy from millisecond bounds.
    pub fn new(min_wait_ms: u64, max_wait_ms: u64, default_wait_ms: u64) -> Self {
        Self {
            min_wait: Duration::from_millis(min_wait_ms),
            max_wait: Duration::from_millis(max_wait_ms),
            default_wait: Duration::from_millis(default_wait_ms),
        }
    }

    /// Runs `op`, retrying exactly once on a transient failure.
    ///
    /// Returns `Ok(None)` when the resource does not exist, so callers can
    /// distinguish "absent" from "failed".
    pub async fn call<R, F, Fut>(&self, mut op: F) -> Result<Option<R>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let mut retried = false;
        loop {
            match op().await {
                Ok(value) => return Ok(Some(value)),
                Err(TideError::NotFound { url }) => {
                    tracing::debug!(url = %url, "resource absent");
                    return Ok(None);
                }
                Err(err @ TideError::Transient { .. }) => {
                    if retried {
                        return Err(err);
                    }
                    let wait = self.backoff(&err);
                    tracing::warn!(error = %err, wait_ms = wait.as_millis() as u64, "transient failure, backing off");
                    tokio::time::sleep(wait).await;
                    retried = true;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Picks the wait duration for one transient failure: the server hint
    /// clamped to the configured window, or the default when absent.
    fn backoff(&self, err: &TideError) -> Duration {
        match err {
            TideError::Transient {
                retry_after: Some(hint),
                ..
            } => (*hint).clamp(self.min_wait, self.max_wait),
            _ => self.default_wait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Policy with waits short enough for tests to sleep through for real.
    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(1, 10, 2)
    }

    fn transient(retry_after: Option<Duration>) -> TideError {
        TideError::Transient {
            url: "https://api.example.com/users/u1".to_string(),
            status: 429,
            retry_after,
        }
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let result = fast_policy().call(|| std::future::ready(Ok(7))).await;
        assert_eq!(result.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let result: Result<Option<u32>> = fast_policy()
            .call(|| {
                std::future::ready(Err(TideError::NotFound {
                    url: "https://api.example.com/users/gone".to_string(),
                }))
            })
            .await;
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transient_retries_once_then_succeeds() {
        let attempts = RefCell::new(0);
        let result = fast_policy()
            .call(|| {
                *attempts.borrow_mut() += 1;
                let outcome = if *attempts.borrow() == 1 {
                    Err(transient(None))
                } else {
                    Ok(42)
                };
                std::future::ready(outcome)
            })
            .await;

        assert_eq!(result.unwrap(), Some(42));
        assert_eq!(*attempts.borrow(), 2);
    }

    #[tokio::test]
    async fn test_second_transient_surfaces() {
        let attempts = RefCell::new(0);
        let result: Result<Option<u32>> = fast_policy()
            .call(|| {
                *attempts.borrow_mut() += 1;
                std::future::ready(Err(transient(None)))
            })
            .await;

        assert!(matches!(result, Err(TideError::Transient { .. })));
        // One retry, never an unbounded loop.
        assert_eq!(*attempts.borrow(), 2);
    }

    #[tokio::test]
    async fn test_permanent_surfaces_immediately() {
        let attempts = RefCell::new(0);
        let result: Result<Option<u32>> = fast_policy()
            .call(|| {
                *attempts.borrow_mut() += 1;
                std::future::ready(Err(TideError::UnexpectedStatus {
                    url: "https://api.example.com/users/u1".to_string(),
                    status: 500,
                }))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*attempts.borrow(), 1);
    }

    #[test]
    fn test_backoff_clamps_server_hint() {
        let policy = RetryPolicy::new(2_000, 15_000, 5_000);

        let low = policy.backoff(&transient(Some(Duration::from_millis(100))));
        assert_eq!(low, Duration::from_secs(2));

        let high = policy.backoff(&transient(Some(Duration::from_secs(600))));
        assert_eq!(high, Duration::from_secs(15));

        let mid = policy.backoff(&transient(Some(Duration::from_secs(7))));
        assert_eq!(mid, Duration::from_secs(7));

        let none = policy.backoff(&transient(None));
        assert_eq!(none, Duration::from_secs(5));
    }
}
