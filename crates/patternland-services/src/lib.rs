//! Patternland Services
//!
//! Query and mutation workflows on top of the API client: the pattern
//! create-then-upload workflow, user and auth operations, a keyed query cache
//! and the notifications that report each mutation's outcome.

pub mod auth;
pub mod backend;
pub mod mutation;
pub mod notify;
pub mod patterns;
pub mod query_cache;
pub mod users;

pub use auth::AuthService;
pub use backend::{AuthBackend, PatternBackend, UserBackend};
pub use mutation::{Invalidate, MutationContext, MutationHooks};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use patterns::{pattern_files, PatternFileEntry, PatternService};
pub use query_cache::{QueryCache, QueryKey};
pub use users::UserService;
