//! Patternland Core Library
//!
//! This crate provides the domain models, form normalization, error types and
//! configuration shared by the Patternland API client, service layer and CLI.

pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod pagination;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{AppError, LogLevel};
pub use forms::{AddPatternForm, EditPatternForm, PatternForm};
pub use pagination::{Page, DEFAULT_PAGE_SIZE};
