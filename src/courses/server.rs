//! Course API server implementation
//!
//! Owns the store, builds the router and runs it on a TCP listener.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::api::create_router;
use super::config::ServerConfig;
use super::store::CourseStore;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Course records
    pub store: Arc<CourseStore>,
}

// ============================================================================
// Course Server
// ============================================================================

/// HTTP server for the course API
pub struct CourseServer {
    config: ServerConfig,
    state: AppState,
}

impl CourseServer {
    /// Create a new server with a fresh store
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let store = if config.seed_demo_data {
            CourseStore::with_demo_data()
        } else {
            CourseStore::new()
        };

        Self::with_store(config, Arc::new(store))
    }

    /// Create a server around an existing store
    pub fn with_store(config: ServerConfig, store: Arc<CourseStore>) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let state = AppState { store };

        Ok(Self { config, state })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router =
            create_router(self.state.clone()).layer(DefaultBodyLimit::max(self.config.max_body_bytes));

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Bind the configured address and serve until the process exits
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{addr}: {e}")))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        let course_count = self.state.store.len().await;
        tracing::info!(
            addr = %local_addr,
            courses = course_count,
            "Listening for course API requests"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Course server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
            demo_data: self.config.seed_demo_data,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
    pub demo_data: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Course API Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             CORS: {}\n\
             Request Logging: {}\n\
             Demo Data: {}",
            "",
            self.bind_address,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" },
            if self.demo_data { "loaded" } else { "none" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind: {0}")]
    Bind(String),

    #[error("Server error: {0}")]
    Serve(String),
}

// ============================================================================
// Tests
// ============================================================================
