//! Concurrent fan-out/fan-in of independent work items
//!
//! [`TaskDispatcher`] takes a batch of work items and an async operation,
//! spawns one tokio task per item and returns a [`DispatchReport`] holding
//! exactly one [`TaskResult`] per item once every task has finished.
//!
//! ```text
//!            ┌──────────────┐
//!  items ──▶ │  dispatcher  │──spawn──▶ task 0 ──┐
//!            │              │──spawn──▶ task 1 ──┤  JoinSet + CompletionBarrier
//!            │              │──spawn──▶ task N ──┤
//!            └──────────────┘                    ▼
//!                                      DispatchReport (N results)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use minicourse::dispatch::TaskDispatcher;
//!
//! # async fn example() {
//! let dispatcher = TaskDispatcher::unbounded();
//! let report = dispatcher
//!     .dispatch(vec![1u32, 2, 3], |n| async move { Ok::<_, String>(n * 10) })
//!     .await;
//!
//! assert_eq!(report.len(), 3);
//! # }
//! ```

pub mod barrier;
pub mod dispatcher;
pub mod result;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use barrier::{CompletionBarrier, CompletionGuard};
pub use dispatcher::TaskDispatcher;
pub use result::{DispatchReport, TaskFailure, TaskOutcome, TaskResult};

/// Optional limits applied to a dispatched batch
///
/// The default is unbounded: every item gets its own task immediately and
/// no task is timed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum number of operations running at once (`None` = unbounded)
    pub max_concurrency: Option<usize>,

    /// Per-task time limit for the operation (`None` = no limit)
    pub task_timeout: Option<Duration>,
}

impl DispatchConfig {
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.max_concurrency == Some(0) {
            return Err(DispatchError::ZeroConcurrency);
        }

        if self.task_timeout == Some(Duration::ZERO) {
            return Err(DispatchError::ZeroTimeout);
        }

        Ok(())
    }
}

/// Invalid dispatcher configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("task_timeout must be greater than zero")]
    ZeroTimeout,
}
