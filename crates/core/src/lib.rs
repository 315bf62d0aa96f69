//! Portaria Assistant Core Library
//!
//! Foundational utilities shared by every crate in the workspace:
//! - Error handling (`AppError`, `AppResult`, `ApiError`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, LegacyStoreConfig};
pub use error::{ApiError, AppError, AppResult};
pub use logging::LogFormat;
