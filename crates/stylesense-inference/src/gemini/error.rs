//! Gemini-specific error classification.

use stylesense_core::{is_quota_signal, Error};

/// Gemini error classes that drive different handling upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Missing or rejected API key.
    AuthenticationError,
    /// Usage tier exhausted (HTTP 429 / `RESOURCE_EXHAUSTED`).
    QuotaExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Malformed request.
    InvalidArgument,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status, canonical status and message.
    pub fn from_response(status: u16, api_status: &str, message: &str) -> Self {
        if status == 429 || api_status == "RESOURCE_EXHAUSTED" || is_quota_signal(message) {
            return Self::QuotaExceeded;
        }
        match (status, api_status) {
            (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => {
                Self::AuthenticationError
            }
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) | (_, "INVALID_ARGUMENT") => Self::InvalidArgument,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Convert a classified Gemini failure to a stylesense Error.
pub fn to_stylesense_error(code: GeminiErrorCode, message: &str) -> Error {
    match code {
        GeminiErrorCode::QuotaExceeded => Error::QuotaExceeded(message.to_string()),
        GeminiErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        GeminiErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        GeminiErrorCode::InvalidArgument => {
            Error::Inference(format!("Invalid request: {}", message))
        }
        GeminiErrorCode::ServerError => Error::Inference(format!("Server error: {}", message)),
        GeminiErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}
