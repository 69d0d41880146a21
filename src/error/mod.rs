//! Error types for the OpenCGA client.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all client operations.
///
/// Every failure kind the session layer can produce is a distinct variant so
/// callers can branch on it. Transport failures pass through as
/// [`OpencgaError::Network`] untouched.
#[derive(Error, Debug)]
pub enum OpencgaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The session is valid but not allowed to perform the request (HTTP 403).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Job failed: {status} ({date}): {message}")]
    JobFailed {
        status: String,
        date: String,
        message: String,
    },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OpencgaError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) | Self::PermissionDenied(_) => ErrorCategory::Authentication,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidOperation(_) | Self::InvalidArgument(_) => ErrorCategory::Usage,
            Self::JobFailed { .. } => ErrorCategory::Job,
            Self::Network(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::Network(_) => ErrorCategory::Network,
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
        }
    }

    /// 401, 403, or a rejected login.
    pub fn is_auth_failure(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// Whether the server rejected the token itself (HTTP 401), so a fresh
    /// token could make the request succeed. Permission denials are not.
    pub fn is_expired_session(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::Api { status: 401, .. }
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        if matches!(self, Self::PermissionDenied(_) | Self::Api { status: 403, .. }) {
            return RecoverySuggestion::RequestAccess;
        }
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::LogInAgain,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Usage => RecoverySuggestion::FixArguments,
            ErrorCategory::Job => RecoverySuggestion::InspectJobLogs,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

impl From<toml::de::Error> for OpencgaError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OpencgaError>;
