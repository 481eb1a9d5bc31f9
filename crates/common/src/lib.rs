//! Antiplagiat Common Library
//!
//! Shared code for the Antiplagiat services including:
//! - Wire contracts exchanged between gateway, storage and analysis
//! - Content hashing
//! - Database models and repositories
//! - Typed HTTP clients for the downstream services
//! - Error types and handling
//! - Configuration management
//! - Logging, metrics and shutdown plumbing

pub mod clients;
pub mod config;
pub mod db;
pub mod errors;
pub mod hashing;
pub mod metrics;
pub mod models;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use hashing::ContentHash;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder student name when the client omits one
pub const DEFAULT_STUDENT_NAME: &str = "unknown";

/// Placeholder task id when the client omits one
pub const DEFAULT_TASK_ID: &str = "unknown";

/// Placeholder filename when the client omits one
pub const DEFAULT_FILENAME: &str = "uploaded_file.txt";
