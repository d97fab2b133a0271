//! Domain methods for the Patternland API client.
//!
//! Request and response types come from `patternland_core::models`.

mod login;
mod patterns;
mod users;

pub use patterns::upload_form;
