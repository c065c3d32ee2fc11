//! In-memory course CRUD API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │          Course API Server          │
//! │                                     │
//! │  ┌──────────────────────────────┐  │
//! │  │        REST API              │  │
//! │  │  GET    /                    │  │
//! │  │  GET    /courses             │  │
//! │  │  DELETE /courses             │  │
//! │  │  POST   /course              │  │
//! │  │  GET    /course/{id}         │  │
//! │  │  PUT    /course/{id}         │  │
//! │  │  DELETE /course/{id}         │  │
//! │  └──────────────────────────────┘  │
//! │                 │                   │
//! │  ┌──────────────────────────────┐  │
//! │  │  CourseStore (RwLock<Vec>)   │  │
//! │  └──────────────────────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use minicourse::courses::{CourseServer, ServerConfig};
//!
//! let server = CourseServer::new(ServerConfig::default())?;
//! server.start().await?;
//! ```

pub mod api;
pub mod config;
pub mod model;
pub mod server;
pub mod store;

// Re-export main types
pub use config::{ConfigError, ServerConfig};
pub use model::{Author, Course};
pub use server::{AppState, CourseServer, ServerError};
pub use store::{CourseStore, IdGenerator};
