//! Error types for stylesense.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Result type alias using stylesense's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for stylesense operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream response did not satisfy the expected schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream usage tier exhausted (rate limit / resource exhausted)
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Inference/generation failed for any other reason
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller must confirm before the operation may start
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the quota/rate-limit class, which callers handle differently
    /// from every other failure.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Error::QuotaExceeded(_))
    }

    /// Short machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Database(_) => "database",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation",
            Error::QuotaExceeded(_) => "quota_exceeded",
            Error::Inference(_) => "inference",
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "config",
            Error::InvalidInput(_) => "invalid_input",
            Error::ConfirmationRequired(_) => "confirmation_required",
            Error::Request(_) => "request",
            Error::Internal(_) => "internal",
            Error::Io(_) => "io",
        }
    }
}

static QUOTA_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)quota\s*exceeded|exceeded\s+your\s+current\s+quota|resource[\s_]*(has\s+been\s+)?exhausted|rate[\s_-]*limit",
    )
    .expect("quota signal pattern is valid")
});

/// Check whether an upstream error message signals a quota/rate-limit condition.
pub fn is_quota_signal(message: &str) -> bool {
    QUOTA_SIGNAL.is_match(message)
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
