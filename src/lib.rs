//! minicourse - course CRUD API and concurrent status checker
//!
//! Two small programs sharing one crate:
//!
//! - an in-memory CRUD HTTP API for course records, and
//! - a fan-out checker that fetches HTTP status codes for a list of URLs
//!   concurrently and waits for every one of them.
//!
//! # Architecture
//!
//! - [`dispatch`] - Fan-out/fan-in task dispatcher with a completion barrier
//! - [`status`] - HTTP status probe and checker built on the dispatcher
//! - [`courses`] - Course model, in-memory store, REST API and server
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//! - [`utils`] - Retry helpers, URL helpers and domain errors
//!
//! # Example
//!
//! ```no_run
//! use minicourse::config::Config;
//! use minicourse::status::StatusChecker;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let checker = StatusChecker::new(&config.checker)?;
//!     let report = checker.check(config.checker.targets.clone()).await;
//!     println!("{} of {} endpoints answered", report.success_count(), report.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod courses;
pub mod dispatch;
pub mod error;
pub mod status;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{CheckerConfig, Config};
    pub use crate::courses::{Course, CourseServer, CourseStore, ServerConfig};
    pub use crate::dispatch::{DispatchConfig, DispatchReport, TaskDispatcher, TaskOutcome};
    pub use crate::error::{Error, ErrorCategory, MinicourseErrorTrait, Result};
    pub use crate::status::StatusChecker;
}

// Direct re-exports for convenience
pub use dispatch::{DispatchReport, TaskDispatcher, TaskFailure, TaskOutcome, TaskResult};
