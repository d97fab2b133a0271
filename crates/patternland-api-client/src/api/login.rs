use patternland_core::models::{LoginCredentials, Message, NewPassword, Token};

use crate::{ApiClient, Result};

impl ApiClient {
    /// Exchange credentials for a bearer token (form-encoded, OAuth2 password flow).
    pub async fn login_access_token(&self, credentials: &LoginCredentials) -> Result<Token> {
        self.post_form(
            "/login/access-token",
            &[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ],
        )
        .await
    }

    /// Ask the server to email a password recovery link.
    pub async fn recover_password(&self, email: &str) -> Result<Message> {
        self.post_empty(&format!(
            "/password-recovery/{}",
            urlencoding::encode(email)
        ))
        .await
    }

    /// Set a new password using the token from the recovery email.
    pub async fn reset_password(&self, body: &NewPassword) -> Result<Message> {
        self.post_json("/reset-password/", body).await
    }
}
