//! Error types for the fetcher and the course store
//!
//! This module defines the domain error types used throughout the application.

use thiserror::Error;

/// Errors that can occur while probing an HTTP endpoint
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (connection refused, DNS, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classify a reqwest error, separating timeouts from other transport failures
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Check if the failure is transient and worth another attempt
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_request() || e.is_body(),
            Self::Timeout => true,
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors returned by the in-memory course store
///
/// The display strings double as the JSON messages returned by the API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CourseError {
    /// The request carried no body at all
    #[error("No data sent")]
    NoData,

    /// The decoded record has an empty course name
    #[error("Data is empty")]
    EmptyName,

    /// Another record already uses this course name
    #[error("This course already exists")]
    Duplicate(String),

    /// No record with this id
    #[error("Course does not exist")]
    NotFound(String),
}
