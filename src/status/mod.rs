//! Concurrent HTTP status checks
//!
//! Fans a list of URLs out through the [`TaskDispatcher`], one GET per URL,
//! and reports the status code each endpoint answered with. An unreachable
//! endpoint is recorded as a failed result; the other checks keep running.
//!
//! # Example
//!
//! ```no_run
//! use minicourse::config::CheckerConfig;
//! use minicourse::status::{StatusChecker, DEFAULT_TARGETS};
//!
//! # async fn example() -> minicourse::error::Result<()> {
//! let checker = StatusChecker::new(&CheckerConfig::default())?;
//! let targets = DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect();
//! let report = checker.check(targets).await;
//!
//! for (url, status) in report.succeeded() {
//!     println!("{url}: {status}");
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::Client;
use std::sync::Arc;

use crate::config::CheckerConfig;
use crate::dispatch::{DispatchReport, TaskDispatcher, TaskOutcome, TaskResult};
use crate::error::Result;
use crate::utils::error::FetchError;
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Endpoints checked when no targets are given
pub const DEFAULT_TARGETS: &[&str] = &[
    "https://google.com",
    "https://fb.com",
    "https://lco.dev",
    "https://goat.com",
    "https://github.com",
];

/// Single-endpoint status probe
///
/// Any HTTP status, including 4xx and 5xx, is a successful probe; only
/// transport failures are errors. Redirects are followed.
#[derive(Debug, Clone)]
pub struct StatusProbe {
    client: Client,
    retry: RetryConfig,
}

impl StatusProbe {
    /// Build a probe from the checker configuration
    pub fn new(config: &CheckerConfig) -> std::result::Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            retry: config.retry_config(),
        })
    }

    /// GET `url` and return the response status code
    ///
    /// Transient transport failures are retried per the retry configuration.
    pub async fn probe(&self, url: &str) -> std::result::Result<u16, FetchError> {
        with_retry_if(&self.retry, || self.probe_once(url), FetchError::is_recoverable).await
    }

    async fn probe_once(&self, url: &str) -> std::result::Result<u16, FetchError> {
        tracing::debug!(url = %url, "Probing endpoint");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        Ok(response.status().as_u16())
    }
}

/// Checks many endpoints concurrently
#[derive(Debug, Clone)]
pub struct StatusChecker {
    probe: Arc<StatusProbe>,
    dispatcher: TaskDispatcher,
}

impl StatusChecker {
    /// Create a checker from configuration
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        let probe = StatusProbe::new(config)?;
        let dispatcher = TaskDispatcher::new(config.dispatch_config())?;

        Ok(Self {
            probe: Arc::new(probe),
            dispatcher,
        })
    }

    /// Create a checker from an existing probe and dispatcher
    pub fn with_parts(probe: StatusProbe, dispatcher: TaskDispatcher) -> Self {
        Self {
            probe: Arc::new(probe),
            dispatcher,
        }
    }

    /// Probe every URL and wait for all of them
    pub async fn check(&self, urls: Vec<String>) -> DispatchReport<String, u16> {
        self.check_with(urls, |_| {}).await
    }

    /// Probe every URL, calling `on_complete` as each result arrives
    pub async fn check_with<C>(&self, urls: Vec<String>, on_complete: C) -> DispatchReport<String, u16>
    where
        C: FnMut(&TaskResult<String, u16>),
    {
        let probe = Arc::clone(&self.probe);

        self.dispatcher
            .dispatch_with(
                urls,
                move |url: String| {
                    let probe = Arc::clone(&probe);
                    async move { probe.probe(&url).await }
                },
                on_complete,
            )
            .await
    }
}

/// One line of human-readable output for a finished check
pub fn format_result(result: &TaskResult<String, u16>) -> String {
    match &result.outcome {
        TaskOutcome::Succeeded(status) => {
            format!("Status code is {status} for endpoint {}", result.item)
        }
        TaskOutcome::Failed(failure) => {
            format!("Failed to reach the endpoint {}: {failure}", result.item)
        }
    }
}
