//! HTTP client for the Patternland API.
//!
//! Provides a small client with optional bearer auth, generic JSON/form/multipart
//! helpers, and domain methods for login, users and patterns. Every non-success
//! response becomes [`AppError::Api`] carrying the status and raw body so the
//! caller can extract the server's `detail`.

pub mod api;

use bytes::Bytes;
use patternland_core::{AppError, ClientConfig};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication strategy for the API.
#[derive(Clone)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

/// HTTP client for the Patternland API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    auth: Option<Auth>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(AppError::transport)?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.trim_end_matches('/').to_string(),
            auth: config.token.clone().map(Auth::Bearer),
        })
    }

    /// Create client from environment (see [`ClientConfig::from_env`]).
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Same client, authenticating with `auth` from now on.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below the API prefix.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(Auth::Bearer(token)) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send with auth applied; non-2xx responses become [`AppError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(AppError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %error_text, "API request failed");
            return Err(AppError::api(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text().await.map_err(AppError::transport)?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::Decode(format!("Failed to parse response as JSON: {}", e)))
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!(method = "GET", path, "API request");
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// GET raw bytes.
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes> {
        tracing::debug!(method = "GET", path, "API download");
        let response = self.send(self.client.get(self.build_url(path))).await?;
        response.bytes().await.map_err(AppError::transport)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(method = "POST", path, "API request");
        let request = self.client.post(self.build_url(path)).json(body);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// POST with no body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!(method = "POST", path, "API request");
        let response = self.send(self.client.post(self.build_url(path))).await?;
        Self::read_json(response).await
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(method = "PUT", path, "API request");
        let request = self.client.put(self.build_url(path)).json(body);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// PATCH JSON body and deserialize response.
    pub async fn patch_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(method = "PATCH", path, "API request");
        let request = self.client.patch(self.build_url(path)).json(body);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        tracing::debug!(method = "POST", path, "API form request");
        let request = self.client.post(self.build_url(path)).form(form);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        tracing::debug!(method = "POST", path, "API multipart request");
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    /// DELETE request and deserialize the acknowledgement.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!(method = "DELETE", path, "API request");
        let response = self.send(self.client.delete(self.build_url(path))).await?;
        Self::read_json(response).await
    }
}

// Re-export domain types for convenience.
pub use patternland_core::models::{
    Message, PatternCreate, PatternFilter, PatternPublic, PatternUpdate, PatternsPublic, Token,
    UploadFilesRequest, UserPublic, UsersPublic,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_prefix() {
        let config = ClientConfig {
            api_url: "https://patterns.example.com/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://patterns.example.com");
        assert_eq!(
            client.build_url("/patterns/"),
            "https://patterns.example.com/api/v1/patterns/"
        );
        assert!(!client.is_authenticated());
    }

    #[test]
    fn auth_debug_hides_token() {
        let auth = Auth::Bearer("secret-token".to_string());
        assert_eq!(format!("{:?}", auth), "Bearer(***)");

        let client = ApiClient::new(&ClientConfig::default())
            .unwrap()
            .with_auth(auth);
        assert!(client.is_authenticated());
        assert!(!format!("{:?}", client).contains("secret-token"));
    }
}
