use patternland_core::models::{
    Message, UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe,
    UsersPublic,
};
use patternland_core::Page;
use uuid::Uuid;

use crate::{ApiClient, Result};

impl ApiClient {
    /// Register a new account without logging in.
    pub async fn register_user(&self, body: &UserRegister) -> Result<UserPublic> {
        self.post_json("/users/signup", body).await
    }

    /// The account the current token belongs to.
    pub async fn read_user_me(&self) -> Result<UserPublic> {
        self.get("/users/me", &[]).await
    }

    pub async fn update_user_me(&self, body: &UserUpdateMe) -> Result<UserPublic> {
        self.patch_json("/users/me", body).await
    }

    pub async fn update_password_me(&self, body: &UpdatePassword) -> Result<Message> {
        self.patch_json("/users/me/password", body).await
    }

    pub async fn delete_user_me(&self) -> Result<Message> {
        self.delete("/users/me").await
    }

    /// List users (superuser only).
    pub async fn read_users(&self, page: Page) -> Result<UsersPublic> {
        self.get("/users/", &page.to_query()).await
    }

    pub async fn create_user(&self, body: &UserCreate) -> Result<UserPublic> {
        self.post_json("/users/", body).await
    }

    pub async fn update_user(&self, user_id: Uuid, body: &UserUpdate) -> Result<UserPublic> {
        self.patch_json(&format!("/users/{}", user_id), body).await
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<Message> {
        self.delete(&format!("/users/{}", user_id)).await
    }
}
