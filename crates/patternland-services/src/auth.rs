//! Login, sign-up and password recovery

use std::sync::Arc;

use patternland_core::forms::{ResetPasswordForm, SignUpForm};
use patternland_core::models::{LoginCredentials, Token, UserPublic};
use patternland_core::AppError;
use validator::Validate;

use crate::backend::AuthBackend;
use crate::mutation::{Invalidate, MutationContext, MutationHooks};
use crate::query_cache::QueryKey;

pub const RECOVERY_EMAIL_SENT: &str = "Password recovery email sent successfully.";
pub const PASSWORD_RESET: &str = "Password updated successfully.";

pub struct AuthService<B> {
    backend: Arc<B>,
    ctx: MutationContext,
}

impl<B> Clone for AuthService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            ctx: self.ctx.clone(),
        }
    }
}

impl<B: AuthBackend> AuthService<B> {
    pub fn new(backend: Arc<B>, ctx: MutationContext) -> Self {
        Self { backend, ctx }
    }

    /// Exchange credentials for a bearer token. Failures are reported with the
    /// server's detail, e.g. "Incorrect email or password".
    #[tracing::instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Token, AppError> {
        credentials.validate()?;

        let hooks = MutationHooks::new("login").invalidate(Invalidate::Prefix(QueryKey::current_user()));
        let result = self.backend.login(credentials).await;
        self.ctx.settle(result, &hooks).await
    }

    #[tracing::instrument(skip(self, form), fields(email = %form.email))]
    pub async fn signup(&self, form: &SignUpForm) -> Result<UserPublic, AppError> {
        let body = form.to_register()?;

        let hooks = MutationHooks::new("signup").invalidate(Invalidate::Prefix(QueryKey::users()));
        let result = self.backend.register(&body).await;
        self.ctx.settle(result, &hooks).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn recover_password(&self, email: &str) -> Result<(), AppError> {
        if email.is_empty() {
            return Err(AppError::InvalidInput("Email is required".to_string()));
        }

        let hooks = MutationHooks::new("recover_password").on_success(RECOVERY_EMAIL_SENT);
        let result = self.backend.recover_password(email).await;
        self.ctx.settle(result, &hooks).await.map(|_| ())
    }

    #[tracing::instrument(skip(self, form))]
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<(), AppError> {
        let body = form.to_new_password()?;

        let hooks = MutationHooks::new("reset_password").on_success(PASSWORD_RESET);
        let result = self.backend.reset_password(&body).await;
        self.ctx.settle(result, &hooks).await.map(|_| ())
    }

    /// Forget every cached query.
    pub async fn logout(&self) {
        self.ctx.cache().clear().await;
        tracing::info!("Logged out");
    }
}
