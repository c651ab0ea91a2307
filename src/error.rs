// src/error.rs

//! Unified error handling for the initializer.

use std::fmt;

use thiserror::Error;

use crate::pipeline::retry::ErrorKind;

/// Result type alias for initializer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Sitemap missing or malformed
    #[error("Sitemap error in {source_name}: {message}")]
    Sitemap {
        source_name: String,
        message: String,
    },

    /// Registry rejected the credentials
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Non-success HTTP status
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Page answered 404, usually because the deploy has not landed yet
    #[error("Page not published yet: {0}")]
    PageNotReady(String),

    /// Issue labels do not follow the kind/fingerprint convention
    #[error("Issue #{number} has malformed labels: {message}")]
    DataIntegrity { number: u64, message: String },

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a sitemap parsing error.
    pub fn sitemap(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Sitemap {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a label integrity error for an issue.
    pub fn data_integrity(number: u64, message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            number,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify this error for the retry policy.
    pub fn retry_kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Http(e) if e.is_connect() || e.is_request() => ErrorKind::Connection,
            Self::Http(e) => match e.status() {
                Some(status) if status.is_server_error() => ErrorKind::Http5xx(status.as_u16()),
                Some(status) if status.as_u16() == 429 => ErrorKind::Throttled,
                _ => ErrorKind::Other,
            },
            Self::Status { status, .. } if *status == 429 => ErrorKind::Throttled,
            Self::Status { status, .. } if *status >= 500 => ErrorKind::Http5xx(*status),
            Self::PageNotReady(_) => ErrorKind::NotReady,
            _ => ErrorKind::Other,
        }
    }
}
