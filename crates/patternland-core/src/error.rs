//! Error types module
//!
//! Every failure the client can surface is unified under [`AppError`]: form
//! validation, non-success HTTP responses, transport and decoding failures, local
//! file IO and configuration problems.
//!
//! [`ErrorMetadata`] lets an error describe how it should be presented. The
//! services use [`ErrorMetadata::client_message`] as the text of the error
//! notification and [`ErrorMetadata::log_level`] to pick the tracing level.

use std::io;

/// Fallback notification text when the server gave no usable detail.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected requests the user can fix
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation
pub trait ErrorMetadata {
    /// HTTP status returned by the server, if the error came from a response
    fn http_status_code(&self) -> Option<u16>;

    /// Machine-readable error code (e.g., "API_ERROR")
    fn error_code(&self) -> &'static str;

    /// Text shown to the user in an error notification
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to send request: {message}")]
    Transport {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl AppError {
    /// Wrap a transport-level failure (connection refused, TLS, timeout...).
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AppError::Transport {
            message: err.to_string(),
            source: anyhow::Error::new(err),
        }
    }

    /// Build an error from a non-success response.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        AppError::Api {
            status,
            body: body.into(),
        }
    }

    /// True for a response the server rejected with 401/403.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Api { status, .. } if *status == 401 || *status == 403)
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Pull the user-facing message out of an error body.
///
/// `{"detail": "text"}` yields the text, `{"detail": [{"msg": ..}, ..]}` yields
/// the first `msg`, anything else yields [`GENERIC_ERROR_MESSAGE`].
pub fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Api { .. } => "API_ERROR",
            AppError::Transport { .. } => "TRANSPORT_ERROR",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Api { body, .. } => extract_detail(body),
            AppError::InvalidInput(ref msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) => LogLevel::Debug,
            AppError::Api { status, .. } if *status < 500 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}
