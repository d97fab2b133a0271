//! Configuration module
//!
//! Client settings are read from the environment (after loading `.env` with
//! `dotenvy`): where the API lives, which token to send and how lists page.

use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::pagination::DEFAULT_PAGE_SIZE;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Settings for talking to the Patternland API
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_prefix: String,
    /// Bearer token sent with every authenticated request
    pub token: Option<String>,
    /// `None` keeps the HTTP client's default (no timeout)
    pub http_timeout: Option<Duration>,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            token: None,
            http_timeout: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load from PATTERNLAND_API_URL (or API_URL), PATTERNLAND_API_PREFIX,
    /// PATTERNLAND_TOKEN, PATTERNLAND_HTTP_TIMEOUT_SECS and PATTERNLAND_PAGE_SIZE.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_url = env::var("PATTERNLAND_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_prefix =
            env::var("PATTERNLAND_API_PREFIX").unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());

        let token = env::var("PATTERNLAND_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let http_timeout = match env::var("PATTERNLAND_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::Config(format!(
                        "PATTERNLAND_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {}",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let page_size = match env::var("PATTERNLAND_PAGE_SIZE") {
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::Config(format!(
                    "PATTERNLAND_PAGE_SIZE must be a positive number, got {}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_prefix: api_prefix.trim_end_matches('/').to_string(),
            token,
            http_timeout,
            page_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "API URL must start with http:// or https://, got {}",
                self.api_url
            )));
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(AppError::Config(format!(
                "API prefix must start with '/', got {}",
                self.api_prefix
            )));
        }
        if self.page_size == 0 {
            return Err(AppError::Config("Page size must be at least 1".to_string()));
        }
        if self.http_timeout == Some(Duration::ZERO) {
            return Err(AppError::Config(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.page_size, 10);
        assert!(config.http_timeout.is_none());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_url = ClientConfig {
            api_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_url.validate(), Err(AppError::Config(_))));

        let bad_prefix = ClientConfig {
            api_prefix: "api/v1".to_string(),
            ..Default::default()
        };
        assert!(bad_prefix.validate().is_err());

        let zero_page = ClientConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(zero_page.validate().is_err());

        let zero_timeout = ClientConfig {
            http_timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn with_token() {
        let config = ClientConfig::default().with_token("abc");
        assert_eq!(config.token.as_deref(), Some("abc"));
    }
}
