//! Current-user settings and user administration

use std::sync::Arc;

use patternland_core::forms::{AddUserForm, ChangePasswordForm, EditUserForm};
use patternland_core::models::{UserPublic, UserUpdateMe, UsersPublic};
use patternland_core::{AppError, Page};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::backend::UserBackend;
use crate::mutation::{Invalidate, MutationContext, MutationHooks};
use crate::query_cache::QueryKey;

pub const USER_UPDATED: &str = "User updated successfully.";
pub const PASSWORD_UPDATED: &str = "Password updated successfully.";
pub const ACCOUNT_DELETED: &str = "Your account has been successfully deleted.";
pub const USER_CREATED: &str = "User created successfully.";
pub const USER_DELETED: &str = "The user was deleted successfully.";
pub const USER_DELETE_FAILED: &str = "An error occurred while deleting the user.";

pub struct UserService<B> {
    backend: Arc<B>,
    ctx: MutationContext,
}

impl<B> Clone for UserService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            ctx: self.ctx.clone(),
        }
    }
}

impl<B: UserBackend> UserService<B> {
    pub fn new(backend: Arc<B>, ctx: MutationContext) -> Self {
        Self { backend, ctx }
    }

    /// The logged-in user, cached under `["currentUser"]`.
    pub async fn current_user(&self) -> Result<UserPublic, AppError> {
        self.ctx
            .cache()
            .fetch(&QueryKey::current_user(), || self.backend.current_user())
            .await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn update_me(&self, body: &UserUpdateMe) -> Result<UserPublic, AppError> {
        body.validate()?;

        let hooks = MutationHooks::new("update_user_me")
            .on_success(USER_UPDATED)
            .invalidate(Invalidate::Prefix(QueryKey::current_user()));
        let result = self.backend.update_me(body).await;
        self.ctx.settle(result, &hooks).await
    }

    #[tracing::instrument(skip(self, form))]
    pub async fn update_password(&self, form: &ChangePasswordForm) -> Result<(), AppError> {
        let body = form.to_update()?;

        let hooks = MutationHooks::new("update_password")
            .on_success(PASSWORD_UPDATED)
            .invalidate(Invalidate::Prefix(QueryKey::current_user()));
        let result = self.backend.update_password(&body).await;
        self.ctx.settle(result, &hooks).await.map(|_| ())
    }

    /// Delete the logged-in account.
    #[tracing::instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<(), AppError> {
        let hooks = MutationHooks::new("delete_user_me")
            .on_success(ACCOUNT_DELETED)
            .invalidate(Invalidate::Prefix(QueryKey::current_user()));
        let result = self.backend.delete_me().await;
        self.ctx.settle(result, &hooks).await.map(|_| ())
    }

    /// One page of the admin user list, cached under `["users",{"page":N}]`.
    pub async fn list(&self, page: Page) -> Result<UsersPublic, AppError> {
        let key = QueryKey::users().with(json!({ "page": page.number }));
        self.ctx
            .cache()
            .fetch(&key, || self.backend.list_users(page))
            .await
    }

    #[tracing::instrument(skip(self, form), fields(email = %form.email))]
    pub async fn add(&self, form: &AddUserForm) -> Result<UserPublic, AppError> {
        let body = form.to_create()?;

        let hooks = MutationHooks::new("create_user")
            .on_success(USER_CREATED)
            .invalidate(Invalidate::Prefix(QueryKey::users()));
        let result = self.backend.create_user(&body).await;
        self.ctx.settle(result, &hooks).await
    }

    /// Update a user. An empty password in the form leaves it unchanged.
    #[tracing::instrument(skip(self, form))]
    pub async fn edit(&self, id: Uuid, form: &EditUserForm) -> Result<UserPublic, AppError> {
        let body = form.to_update()?;

        let hooks = MutationHooks::new("update_user")
            .on_success(USER_UPDATED)
            .invalidate(Invalidate::Prefix(QueryKey::users()));
        let result = self.backend.update_user(id, &body).await;
        self.ctx.settle(result, &hooks).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let hooks = MutationHooks::new("delete_user")
            .on_success(USER_DELETED)
            .on_error(USER_DELETE_FAILED)
            .invalidate(Invalidate::All);
        let result = self.backend.delete_user(id).await;
        self.ctx.settle(result, &hooks).await.map(|_| ())
    }
}
