//! Fan-out/fan-in task dispatcher

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::barrier::CompletionBarrier;
use super::result::{DispatchReport, TaskFailure, TaskOutcome, TaskResult};
use super::{DispatchConfig, DispatchError};

/// Launches one concurrent task per work item and joins on all of them
///
/// A failing or panicking item never aborts its siblings; it is recorded as
/// a [`TaskOutcome::Failed`] result and the batch keeps going.
#[derive(Debug, Clone, Default)]
pub struct TaskDispatcher {
    config: DispatchConfig,
}

impl TaskDispatcher {
    /// Create a dispatcher from a validated configuration
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Dispatcher with no admission control and no timeout
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run `operation` once per item and wait for every task to finish
    pub async fn dispatch<W, T, E, F, Fut>(
        &self,
        items: Vec<W>,
        operation: F,
    ) -> DispatchReport<W, T>
    where
        W: Clone + Debug + Send + Sync + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.dispatch_with(items, operation, |_| {}).await
    }

    /// Like [`dispatch`](Self::dispatch), calling `on_complete` for each
    /// result as it arrives
    ///
    /// `on_complete` runs on the caller's task, once per item, in completion
    /// order.
    pub async fn dispatch_with<W, T, E, F, Fut, C>(
        &self,
        items: Vec<W>,
        operation: F,
        mut on_complete: C,
    ) -> DispatchReport<W, T>
    where
        W: Clone + Debug + Send + Sync + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        C: FnMut(&TaskResult<W, T>),
    {
        let total = items.len();
        let started = Instant::now();

        tracing::info!(
            total = total,
            max_concurrency = ?self.config.max_concurrency,
            task_timeout_ms = ?self.config.task_timeout.map(|d| d.as_millis()),
            "Dispatching batch"
        );

        let operation = Arc::new(operation);
        let barrier = Arc::new(CompletionBarrier::new());
        let semaphore = self
            .config
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let task_timeout = self.config.task_timeout;

        // Copies of every item still owed a result
        let mut pending: HashMap<usize, W> = HashMap::with_capacity(total);
        let mut join_set = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            pending.insert(index, item.clone());

            let guard = barrier.register();
            let operation = Arc::clone(&operation);
            let semaphore = semaphore.clone();

            join_set.spawn(async move {
                let _guard = guard;
                run_task(index, item, operation, semaphore, task_timeout).await
            });
        }

        let mut results = Vec::with_capacity(total);

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => {
                    pending.remove(&result.index);
                    log_completion(&result);
                    on_complete(&result);
                    results.push(result);
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "Dispatched task exited without reporting");
                }
            }
        }

        let mut orphans: Vec<(usize, W)> = pending.into_iter().collect();
        orphans.sort_by_key(|(index, _)| *index);
        for (index, item) in orphans {
            let result = TaskResult {
                index,
                item,
                outcome: TaskOutcome::Failed(TaskFailure::Aborted(
                    "task exited without reporting".to_string(),
                )),
                elapsed: Duration::ZERO,
            };
            log_completion(&result);
            on_complete(&result);
            results.push(result);
        }

        barrier.wait().await;

        let report = DispatchReport {
            results,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            total = report.len(),
            released = barrier.released(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            elapsed_ms = report.elapsed.as_millis(),
            "Batch completed"
        );

        report
    }
}

async fn run_task<W, T, E, F, Fut>(
    index: usize,
    item: W,
    operation: Arc<F>,
    semaphore: Option<Arc<Semaphore>>,
    task_timeout: Option<Duration>,
) -> TaskResult<W, T>
where
    W: Clone,
    E: Display,
    F: Fn(W) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let _permit = match semaphore {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                return TaskResult {
                    index,
                    item,
                    outcome: TaskOutcome::Failed(TaskFailure::Aborted(
                        "admission semaphore closed".to_string(),
                    )),
                    elapsed: Duration::ZERO,
                };
            }
        },
        None => None,
    };

    let started = Instant::now();

    // The call itself sits inside the async block so a panic while building
    // the future is caught as well
    let call = AssertUnwindSafe(async { (*operation)(item.clone()).await }).catch_unwind();

    let outcome = match task_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(finished) => classify(finished),
            Err(_) => TaskOutcome::Failed(TaskFailure::TimedOut(limit)),
        },
        None => classify(call.await),
    };

    TaskResult {
        index,
        item,
        outcome,
        elapsed: started.elapsed(),
    }
}

fn classify<T, E: Display>(
    finished: Result<Result<T, E>, Box<dyn Any + Send>>,
) -> TaskOutcome<T> {
    match finished {
        Ok(Ok(value)) => TaskOutcome::Succeeded(value),
        Ok(Err(err)) => TaskOutcome::Failed(TaskFailure::Error(err.to_string())),
        Err(payload) => TaskOutcome::Failed(TaskFailure::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_completion<W: Debug, T>(result: &TaskResult<W, T>) {
    match &result.outcome {
        TaskOutcome::Succeeded(_) => tracing::debug!(
            index = result.index,
            item = ?result.item,
            elapsed_ms = result.elapsed.as_millis(),
            "Task succeeded"
        ),
        TaskOutcome::Failed(failure) => tracing::warn!(
            index = result.index,
            item = ?result.item,
            error = %failure,
            "Task failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_empty_batch() {
        let dispatcher = TaskDispatcher::unbounded();
        let report = dispatcher
            .dispatch(Vec::<u32>::new(), |n| async move { Ok::<_, String>(n) })
            .await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_every_item_yields_one_result() {
        let dispatcher = TaskDispatcher::unbounded();
        let report = dispatcher
            .dispatch((0..20u32).collect(), |n| async move { Ok::<_, String>(n * 2) })
            .await;

        assert_eq!(report.len(), 20);
        for result in report.into_input_order() {
            assert_eq!(result.outcome, TaskOutcome::Succeeded(result.item * 2));
        }
    }

    #[tokio::test]
    async fn test_error_is_captured_not_fatal() {
        let dispatcher = TaskDispatcher::unbounded();
        let report = dispatcher
            .dispatch(vec![1u32, 2, 3], |n| async move {
                if n == 2 {
                    Err(format!("item {n} failed"))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(report.success_count(), 2);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(*failed[0].0, 2);
        assert_eq!(failed[0].1, &TaskFailure::Error("item 2 failed".into()));
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let dispatcher = TaskDispatcher::unbounded();
        let report = dispatcher
            .dispatch(vec![1u32, 2], |n| async move {
                if n == 1 {
                    panic!("item one exploded");
                }
                Ok::<_, String>(n)
            })
            .await;

        assert_eq!(report.len(), 2);
        let (item, failure) = report.failed().next().unwrap();
        assert_eq!(*item, 1);
        assert_eq!(failure, &TaskFailure::Panicked("item one exploded".into()));
    }

    #[tokio::test]
    async fn test_task_timeout() {
        let config = DispatchConfig::default().with_task_timeout(Duration::from_millis(50));
        let dispatcher = TaskDispatcher::new(config).unwrap();

        let report = dispatcher
            .dispatch(vec![10u64, 5_000], |ms| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, String>(ms)
            })
            .await;

        assert_eq!(report.success_count(), 1);
        let (item, failure) = report.failed().next().unwrap();
        assert_eq!(*item, 5_000);
        assert_eq!(failure, &TaskFailure::TimedOut(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_on_complete_called_once_per_item() {
        let dispatcher = TaskDispatcher::unbounded();
        let mut seen = Vec::new();

        let report = dispatcher
            .dispatch_with(
                vec!["a", "b", "c"],
                |s| async move { Ok::<_, String>(s.len()) },
                |r| seen.push(r.index),
            )
            .await;

        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(report.len(), 3);
    }

    #[tokio::test]
    async fn test_max_concurrency_respected() {
        let config = DispatchConfig::default().with_max_concurrency(2);
        let dispatcher = TaskDispatcher::new(config).unwrap();

        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (in_flight_op, peak_op) = (Arc::clone(&in_flight), Arc::clone(&peak));

        let report = dispatcher
            .dispatch((0..8u32).collect(), move |n| {
                let in_flight = Arc::clone(&in_flight_op);
                let peak = Arc::clone(&peak_op);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(n)
                }
            })
            .await;

        assert_eq!(report.len(), 8);
        assert!(report.all_succeeded());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = DispatchConfig::default().with_max_concurrency(0);
        assert_eq!(
            TaskDispatcher::new(config).unwrap_err(),
            DispatchError::ZeroConcurrency
        );
    }
}
