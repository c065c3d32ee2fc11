//! Unified error handling for the minicourse crate
//!
//! Setup failures from the status checker and the course server are
//! collected into a single `Error` enum. The binary logs its category and
//! whether it is worth retrying before exiting.
//!
//! # Architecture
//!
//! - [`MinicourseErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::courses::config::ConfigError;
pub use crate::courses::server::ServerError;
pub use crate::dispatch::DispatchError;
pub use crate::utils::error::{CourseError, FetchError};

/// Common trait for all minicourse error types
pub trait MinicourseErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP client, bind, serve)
    Network,
    /// Configuration errors
    Config,
}

impl ErrorCategory {
    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Config => "configuration error",
        }
    }
}

/// Unified error type for the minicourse crate
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client construction or probe errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Dispatcher configuration errors
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Course server errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

impl MinicourseErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Dispatch(_) => false,
            // The port may be free on the next attempt
            Self::Server(e) => matches!(e, ServerError::Bind(_)),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Dispatch(_) => ErrorCategory::Config,
            Self::Server(e) => match e {
                ServerError::Config(_) => ErrorCategory::Config,
                ServerError::Bind(_) | ServerError::Serve(_) => ErrorCategory::Network,
            },
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
