//! Data models for the application
//!
//! Request and response bodies of the Patternland API, organized by domain.

mod files;
mod pattern;
mod user;

// Re-export all models for convenient imports
pub use files::*;
pub use pattern::*;
pub use user::*;
