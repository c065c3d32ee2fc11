//! Per-task outcomes and the aggregated batch report

use std::fmt;
use std::time::Duration;

/// Why a task did not produce a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// The operation returned an error
    Error(String),

    /// The operation did not finish within the configured task timeout
    TimedOut(Duration),

    /// The operation panicked
    Panicked(String),

    /// The task was torn down before it could report
    Aborted(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(msg) => write!(f, "{msg}"),
            Self::TimedOut(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
            Self::Aborted(msg) => write!(f, "aborted: {msg}"),
        }
    }
}

/// Terminal state of one task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Succeeded(T),
    Failed(TaskFailure),
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, TaskFailure> {
        match self {
            Self::Succeeded(value) => Ok(value),
            Self::Failed(failure) => Err(failure),
        }
    }
}

/// Outcome of processing one work item, paired with the item itself
#[derive(Debug, Clone)]
pub struct TaskResult<W, T> {
    /// Position of the item in the submitted batch
    pub index: usize,

    /// The originating work item
    pub item: W,

    /// Success value or failure descriptor
    pub outcome: TaskOutcome<T>,

    /// Time spent running the operation (excludes admission wait)
    pub elapsed: Duration,
}

/// Every result of a dispatched batch, in completion order
#[derive(Debug, Clone)]
pub struct DispatchReport<W, T> {
    pub results: Vec<TaskResult<W, T>>,

    /// Wall-clock time from launch to the join barrier
    pub elapsed: Duration,
}

impl<W, T> DispatchReport<W, T> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_success())
    }

    /// Successful items with their values
    pub fn succeeded(&self) -> impl Iterator<Item = (&W, &T)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.value().map(|v| (&r.item, v)))
    }

    /// Failed items with their failure descriptors
    pub fn failed(&self) -> impl Iterator<Item = (&W, &TaskFailure)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.failure().map(|f| (&r.item, f)))
    }

    /// Results re-sorted into submission order
    pub fn into_input_order(mut self) -> Vec<TaskResult<W, T>> {
        self.results.sort_by_key(|r| r.index);
        self.results
    }
}
