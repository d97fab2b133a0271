//! Settling a mutation: notify on success or error, then invalidate queries
//! whatever the outcome.

use std::sync::Arc;

use patternland_core::error::ErrorMetadata;
use patternland_core::{AppError, LogLevel};

use crate::notify::Notifier;
use crate::query_cache::{QueryCache, QueryKey};

/// Which cached queries a mutation makes stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidate {
    Nothing,
    Prefix(QueryKey),
    All,
}

/// Hooks run after a mutation resolves
#[derive(Debug, Clone)]
pub struct MutationHooks {
    pub name: &'static str,
    pub success_message: Option<&'static str>,
    /// Shown instead of the server's detail when set
    pub error_message: Option<&'static str>,
    pub invalidate: Invalidate,
}

impl MutationHooks {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            success_message: None,
            error_message: None,
            invalidate: Invalidate::Nothing,
        }
    }

    pub fn on_success(mut self, message: &'static str) -> Self {
        self.success_message = Some(message);
        self
    }

    pub fn on_error(mut self, message: &'static str) -> Self {
        self.error_message = Some(message);
        self
    }

    pub fn invalidate(mut self, invalidate: Invalidate) -> Self {
        self.invalidate = invalidate;
        self
    }
}

/// Notifier and cache shared by every service
#[derive(Clone)]
pub struct MutationContext {
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl MutationContext {
    pub fn new(cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { cache, notifier }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Run the success/error hook, then the invalidation, and hand the result back.
    pub async fn settle<T>(
        &self,
        result: Result<T, AppError>,
        hooks: &MutationHooks,
    ) -> Result<T, AppError> {
        match &result {
            Ok(_) => {
                tracing::info!(mutation = hooks.name, "Mutation succeeded");
                if let Some(message) = hooks.success_message {
                    self.notifier.success(message);
                }
            }
            Err(err) => {
                log_failure(hooks.name, err);
                let message = hooks
                    .error_message
                    .map(str::to_string)
                    .unwrap_or_else(|| err.client_message());
                self.notifier.error(&message);
            }
        }

        match &hooks.invalidate {
            Invalidate::Nothing => {}
            Invalidate::Prefix(prefix) => {
                self.cache.invalidate(prefix).await;
            }
            Invalidate::All => {
                self.cache.invalidate_all().await;
            }
        }

        result
    }
}

/// Log a failed operation at the error's own level.
pub fn log_failure(operation: &str, err: &AppError) {
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(operation, error = %err, code = err.error_code(), "Operation failed")
        }
        LogLevel::Warn => {
            tracing::warn!(operation, error = %err, code = err.error_code(), "Operation failed")
        }
        LogLevel::Error => {
            tracing::error!(operation, error = %err, code = err.error_code(), "Operation failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notification, RecordingNotifier};

    fn context() -> (MutationContext, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (
            MutationContext::new(QueryCache::new(), notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn settle_success_notifies_and_invalidates() {
        let (ctx, notifier) = context();
        ctx.cache().set(QueryKey::patterns().with(1), 1u8).await;

        let hooks = MutationHooks::new("edit_pattern")
            .on_success("Pattern updated successfully.")
            .invalidate(Invalidate::Prefix(QueryKey::patterns()));
        let value = ctx.settle(Ok::<_, AppError>(7), &hooks).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(
            notifier.notifications(),
            vec![Notification::Success("Pattern updated successfully.".to_string())]
        );
        assert!(ctx.cache().is_stale(&QueryKey::patterns().with(1)).await);
    }

    #[tokio::test]
    async fn settle_error_uses_detail_or_override() {
        let (ctx, notifier) = context();
        ctx.cache().set(QueryKey::current_user(), 1u8).await;

        let hooks = MutationHooks::new("create_pattern").invalidate(Invalidate::All);
        let err = ctx
            .settle(
                Err::<(), _>(AppError::api(409, r#"{"detail":"Duplicate title"}"#)),
                &hooks,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Api { status: 409, .. }));
        assert!(ctx.cache().is_stale(&QueryKey::current_user()).await);

        let hooks = MutationHooks::new("delete_pattern")
            .on_error("An error occurred while deleting the pattern.");
        let _ = ctx
            .settle(Err::<(), _>(AppError::api(500, "")), &hooks)
            .await;

        assert_eq!(
            notifier.errors(),
            vec![
                "Duplicate title",
                "An error occurred while deleting the pattern."
            ]
        );
        assert!(notifier.successes().is_empty());
    }
}
