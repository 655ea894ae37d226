//! Bounded concurrent work pool
//!
//! A fixed worker group draining a bounded channel. Submission blocks when
//! the queue is full, so a slow pipeline applies backpressure instead of
//! dropping work: every submitted item runs at most once and has its
//! outcome observed exactly once. Item failures are isolated, classified,
//! recorded against the item's stats key, and reported to the failure
//! sink; whether a failure also stops the session is the `ignore_errors`
//! policy. When it does, the pool keeps the first failure so the session
//! can surface the actual cause rather than a generic abort.

use crate::output::{FailureSink, Phase, StatsKey, StatsSink};
use crate::{ErrorClass, Result, TideError};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Upper bound on the worker count; requests beyond it are capped rather
/// than rejected.
const MAX_WORKERS: i64 = 64;

type Task = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

struct Job {
    key: Arc<StatsKey>,
    task: Task,
}

/// Fixed-size worker pool with a bounded queue.
pub struct WorkPool {
    tx: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    aborted: Arc<AtomicBool>,
    first_error: Arc<std::sync::Mutex<Option<TideError>>>,
    stats: Arc<dyn StatsSink>,
}

impl WorkPool {
    /// Spawns `requested` workers over a queue of the same capacity.
    ///
    /// Degenerate worker counts are accepted, never fatal: `requested <= 0`
    /// behaves as one worker, absurdly large values are capped.
    pub fn new(
        requested: i64,
        ignore_errors: bool,
        stats: Arc<dyn StatsSink>,
        failures: Arc<dyn FailureSink>,
    ) -> Self {
        let worker_count = requested.clamp(1, MAX_WORKERS) as usize;
        if worker_count as i64 != requested {
            tracing::warn!(requested, effective = worker_count, "clamped worker count");
        }

        let (tx, rx) = mpsc::channel::<Job>(worker_count);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let aborted = Arc::new(AtomicBool::new(false));
        let first_error = Arc::new(std::sync::Mutex::new(None));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = rx.clone();
            let aborted = aborted.clone();
            let first_error = first_error.clone();
            let stats = stats.clone();
            let failures = failures.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only for the dequeue, not for
                    // the job itself.
                    let job = { rx.lock().await.recv().await };
                    let Some(job) = job else { break };
                    run_job(job, ignore_errors, &aborted, &first_error, &stats, &failures).await;
                }
                tracing::trace!(worker_id, "worker finished");
            }));
        }

        Self {
            tx: Some(tx),
            workers,
            aborted,
            first_error,
            stats,
        }
    }

    /// Queues one work item, blocking while the queue is full.
    ///
    /// Fails with [`TideError::SessionAborted`] once an earlier item
    /// failure (with `ignore_errors` off) or a drain has stopped intake;
    /// items already queued or running still drain.
    pub async fn submit<F>(&self, key: Arc<StatsKey>, task: F) -> Result<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        if self.aborted.load(Ordering::SeqCst) {
            return Err(TideError::SessionAborted);
        }
        let tx = self.tx.as_ref().ok_or(TideError::SessionAborted)?;

        self.stats.begin(&key);
        self.stats.record(&key, Phase::Prepared);

        tx.send(Job {
            key,
            task: Box::pin(task),
        })
        .await
        .map_err(|_| TideError::SessionAborted)?;
        Ok(())
    }

    /// Whether a failure has stopped intake.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Stops accepting work, waits up to `timeout` for in-flight items,
    /// then force-cancels stragglers.
    ///
    /// A cancelled item is interrupted mid-flight; it may already have
    /// reported to the document sink.
    ///
    /// Returns the failure that stopped intake, when there was one, so the
    /// caller can report the actual cause instead of a generic abort.
    pub async fn drain(&mut self, timeout: Duration) -> Option<TideError> {
        // Closing the channel lets workers run the queue dry and exit.
        self.tx.take();

        let deadline = Instant::now() + timeout;
        let mut cancelled = 0usize;
        for mut handle in self.workers.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if tokio::time::timeout(remaining, &mut handle).await.is_err() {
                handle.abort();
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            tracing::warn!(cancelled, "drain timeout expired, cancelled in-flight work");
        } else {
            tracing::debug!("pool drained cleanly");
        }

        self.first_error.lock().unwrap().take()
    }
}

/// Runs one job and records its terminal outcome exactly once.
async fn run_job(
    job: Job,
    ignore_errors: bool,
    aborted: &AtomicBool,
    first_error: &std::sync::Mutex<Option<TideError>>,
    stats: &Arc<dyn StatsSink>,
    failures: &Arc<dyn FailureSink>,
) {
    match job.task.await {
        Ok(()) => {
            stats.record(&job.key, Phase::Finished);
        }
        Err(e) if e.class() == ErrorClass::NotFound => {
            // Deleted between enumeration and fetch: a skip, not a failure.
            tracing::debug!(resource = %job.key.resource_url(), "resource vanished, skipping");
        }
        Err(e) => {
            let phase = if e.class() == ErrorClass::PermissionDenied {
                Phase::AccessException
            } else {
                Phase::Exception
            };
            stats.record(&job.key, phase);
            failures.store(&job.key.resource_url(), &e);

            if !ignore_errors {
                aborted.store(true, Ordering::SeqCst);
                tracing::error!(
                    resource = %job.key.resource_url(),
                    error = %e,
                    "item failed with ignore-error off, stopping intake"
                );
                let mut slot = first_error.lock().unwrap();
                if slot.is_none() {
                    *slot = Some(e);
                }
            }
        }
    }
    stats.done(&job.key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use std::sync::atomic::AtomicUsize;

    fn pool_with_sink(workers: i64, ignore_errors: bool) -> (WorkPool, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let pool = WorkPool::new(workers, ignore_errors, sink.clone(), sink.clone());
        (pool, sink)
    }

    fn key(name: &str) -> Arc<StatsKey> {
        Arc::new(StatsKey::new(name))
    }

    #[tokio::test]
    async fn test_backpressure_not_loss() {
        // Many more items than workers; slow tasks force the queue full.
        let (mut pool, _sink) = pool_with_sink(2, true);
        let completed = Arc::new(AtomicUsize::new(0));

        for i in 0..20 {
            let completed = completed.clone();
            pool.submit(key(&format!("item-{}", i)), async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
        }

        pool.drain(Duration::from_secs(5)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn test_failure_isolated_with_ignore_errors() {
        let (mut pool, sink) = pool_with_sink(2, true);
        let completed = Arc::new(AtomicUsize::new(0));

        for i in 0..5 {
            let completed = completed.clone();
            let fail = i == 2;
            pool.submit(key(&format!("item-{}", i)), async move {
                if fail {
                    Err(TideError::Malformed {
                        url: "https://contoso.example/item-2".to_string(),
                        message: "missing field".to_string(),
                    })
                } else {
                    completed.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await
            .unwrap();
        }

        let cause = pool.drain(Duration::from_secs(5)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 4);
        assert_eq!(sink.failures().len(), 1);
        assert!(!pool.is_aborted());
        // Swallowed failures are never promoted to a session cause.
        assert!(cause.is_none());
    }

    #[tokio::test]
    async fn test_first_failure_halts_intake_without_ignore_errors() {
        let (mut pool, sink) = pool_with_sink(1, false);

        pool.submit(key("bad"), async {
            Err(TideError::Malformed {
                url: "https://contoso.example/bad".to_string(),
                message: "missing field".to_string(),
            })
        })
        .await
        .unwrap();

        // Wait for the worker to observe the failure.
        for _ in 0..100 {
            if pool.is_aborted() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(pool.is_aborted());

        let refused = pool.submit(key("after"), async { Ok(()) }).await;
        assert!(matches!(refused, Err(TideError::SessionAborted)));

        // Drain hands back the failure that stopped intake.
        let cause = pool.drain(Duration::from_secs(5)).await;
        assert!(matches!(cause, Some(TideError::Malformed { .. })));
        assert_eq!(sink.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_skip_not_failure() {
        let (mut pool, sink) = pool_with_sink(1, false);

        pool.submit(key("gone"), async {
            Err(TideError::NotFound {
                url: "https://contoso.example/gone".to_string(),
            })
        })
        .await
        .unwrap();

        pool.drain(Duration::from_secs(5)).await;
        assert!(sink.failures().is_empty());
        assert!(!pool.is_aborted());
    }

    #[tokio::test]
    async fn test_permission_denied_records_access_exception() {
        let (mut pool, sink) = pool_with_sink(1, true);

        pool.submit(key("locked"), async {
            Err(TideError::PermissionDenied {
                url: "https://contoso.example/locked".to_string(),
                status: 403,
            })
        })
        .await
        .unwrap();

        pool.drain(Duration::from_secs(5)).await;
        let phases = sink.phases();
        assert!(phases.contains(&("locked".to_string(), Phase::AccessException)));
    }

    #[tokio::test]
    async fn test_degenerate_worker_counts_accepted() {
        for requested in [0, -5, 10_000] {
            let (mut pool, _sink) = pool_with_sink(requested, true);
            let done = Arc::new(AtomicUsize::new(0));
            let counter = done.clone();
            pool.submit(key("one"), async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
            pool.drain(Duration::from_secs(5)).await;
            assert_eq!(done.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_drain_timeout_cancels_stragglers() {
        let (mut pool, _sink) = pool_with_sink(1, true);

        pool.submit(key("stuck"), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await
        .unwrap();

        let started = std::time::Instant::now();
        pool.drain(Duration::from_millis(50)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_submit_after_drain_refused() {
        let (mut pool, _sink) = pool_with_sink(1, true);
        pool.drain(Duration::from_secs(1)).await;

        let refused = pool.submit(key("late"), async { Ok(()) }).await;
        assert!(matches!(refused, Err(TideError::SessionAborted)));
    }
}
