//! Error types for the admin tooling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the managed backend.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The service credential file does not exist.
    #[error("credential file not found: {}", .0.display())]
    MissingCredentials(PathBuf),

    /// The service credential file exists but could not be used.
    #[error("invalid credential file {}: {}", .path.display(), .message)]
    InvalidCredentials { path: PathBuf, message: String },

    /// The backend configuration is incomplete.
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} from {service}: {message}")]
    Http {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The backend returned a rate-limit response.
    #[error("rate limited by {service}")]
    RateLimited { service: &'static str },

    /// The provisioning request was rejected before reaching the backend.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An account with this email already exists.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// No account is registered under this email.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// A response body could not be interpreted.
    #[error("unexpected response from {service}: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdminError {
    /// Returns `true` when the error is transient and the call may succeed
    /// if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` when a request that creates something may be sent
    /// again.
    ///
    /// Only rejections the service answered with qualify. A timeout or a
    /// dropped connection may hide a write that already happened.
    pub fn is_retryable_write(&self) -> bool {
        match self {
            Self::Request(_) => false,
            other => other.is_transient(),
        }
    }
}

/// Convenience alias for admin results.
pub type AdminResult<T> = std::result::Result<T, AdminError>;
