//! Backend seams used by the services
//!
//! The services only talk to the server through these traits. [`ApiClient`]
//! implements all three; tests substitute an in-memory fake.

use async_trait::async_trait;
use bytes::Bytes;
use patternland_api_client::ApiClient;
use patternland_core::models::{
    LoginCredentials, Message, NewPassword, PatternCreate, PatternFilter, PatternPublic,
    PatternUpdate, PatternsPublic, Token, UpdatePassword, UploadFilesRequest, UserCreate,
    UserPublic, UserRegister, UserUpdate, UserUpdateMe, UsersPublic,
};
use patternland_core::{AppError, Page};
use uuid::Uuid;

/// Pattern endpoints
#[async_trait]
pub trait PatternBackend: Send + Sync {
    async fn list_patterns(
        &self,
        page: Page,
        filter: &PatternFilter,
    ) -> Result<PatternsPublic, AppError>;

    async fn get_pattern(&self, id: Uuid) -> Result<PatternPublic, AppError>;

    /// Create the entity from fields only; files go through [`Self::upload_files`].
    async fn create_pattern(&self, body: &PatternCreate) -> Result<PatternPublic, AppError>;

    async fn update_pattern(
        &self,
        id: Uuid,
        body: &PatternUpdate,
    ) -> Result<PatternPublic, AppError>;

    async fn delete_pattern(&self, id: Uuid) -> Result<Message, AppError>;

    /// Attach the populated slots to the record named by `request.id`.
    async fn upload_files(&self, request: &UploadFilesRequest) -> Result<PatternPublic, AppError>;

    async fn download_file(&self, filename: &str) -> Result<Bytes, AppError>;
}

/// User endpoints, self-service and admin
#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn current_user(&self) -> Result<UserPublic, AppError>;

    async fn update_me(&self, body: &UserUpdateMe) -> Result<UserPublic, AppError>;

    async fn update_password(&self, body: &UpdatePassword) -> Result<Message, AppError>;

    async fn delete_me(&self) -> Result<Message, AppError>;

    async fn list_users(&self, page: Page) -> Result<UsersPublic, AppError>;

    async fn create_user(&self, body: &UserCreate) -> Result<UserPublic, AppError>;

    async fn update_user(&self, id: Uuid, body: &UserUpdate) -> Result<UserPublic, AppError>;

    async fn delete_user(&self, id: Uuid) -> Result<Message, AppError>;
}

/// Login, registration and password recovery
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Token, AppError>;

    async fn register(&self, body: &UserRegister) -> Result<UserPublic, AppError>;

    async fn recover_password(&self, email: &str) -> Result<Message, AppError>;

    async fn reset_password(&self, body: &NewPassword) -> Result<Message, AppError>;
}

#[async_trait]
impl PatternBackend for ApiClient {
    async fn list_patterns(
        &self,
        page: Page,
        filter: &PatternFilter,
    ) -> Result<PatternsPublic, AppError> {
        ApiClient::read_patterns(self, page, filter).await
    }

    async fn get_pattern(&self, id: Uuid) -> Result<PatternPublic, AppError> {
        ApiClient::read_pattern(self, id).await
    }

    async fn create_pattern(&self, body: &PatternCreate) -> Result<PatternPublic, AppError> {
        ApiClient::create_pattern(self, body).await
    }

    async fn update_pattern(
        &self,
        id: Uuid,
        body: &PatternUpdate,
    ) -> Result<PatternPublic, AppError> {
        ApiClient::update_pattern(self, id, body).await
    }

    async fn delete_pattern(&self, id: Uuid) -> Result<Message, AppError> {
        ApiClient::delete_pattern(self, id).await
    }

    async fn upload_files(&self, request: &UploadFilesRequest) -> Result<PatternPublic, AppError> {
        ApiClient::upload_files(self, request).await
    }

    async fn download_file(&self, filename: &str) -> Result<Bytes, AppError> {
        ApiClient::download_file(self, filename).await
    }
}

#[async_trait]
impl UserBackend for ApiClient {
    async fn current_user(&self) -> Result<UserPublic, AppError> {
        self.read_user_me().await
    }

    async fn update_me(&self, body: &UserUpdateMe) -> Result<UserPublic, AppError> {
        self.update_user_me(body).await
    }

    async fn update_password(&self, body: &UpdatePassword) -> Result<Message, AppError> {
        self.update_password_me(body).await
    }

    async fn delete_me(&self) -> Result<Message, AppError> {
        self.delete_user_me().await
    }

    async fn list_users(&self, page: Page) -> Result<UsersPublic, AppError> {
        self.read_users(page).await
    }

    async fn create_user(&self, body: &UserCreate) -> Result<UserPublic, AppError> {
        ApiClient::create_user(self, body).await
    }

    async fn update_user(&self, id: Uuid, body: &UserUpdate) -> Result<UserPublic, AppError> {
        ApiClient::update_user(self, id, body).await
    }

    async fn delete_user(&self, id: Uuid) -> Result<Message, AppError> {
        ApiClient::delete_user(self, id).await
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Token, AppError> {
        self.login_access_token(credentials).await
    }

    async fn register(&self, body: &UserRegister) -> Result<UserPublic, AppError> {
        self.register_user(body).await
    }

    async fn recover_password(&self, email: &str) -> Result<Message, AppError> {
        ApiClient::recover_password(self, email).await
    }

    async fn reset_password(&self, body: &NewPassword) -> Result<Message, AppError> {
        ApiClient::reset_password(self, body).await
    }
}
