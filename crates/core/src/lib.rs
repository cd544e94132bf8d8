//! Sumika Core Library
//!
//! Foundational utilities shared by every sumika crate:
//! - Error handling (`AppError`, `AppResult`) including the turn-level
//!   failure taxonomy of the answering pipeline
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
