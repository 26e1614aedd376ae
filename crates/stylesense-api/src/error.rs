//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use stylesense_core::Error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// Upstream output failed schema validation.
    Unprocessable(String),
    QuotaExceeded(String),
    ConfirmationRequired(String),
    ServiceUnavailable(String),
    BadGateway(String),
    Internal(Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::Unprocessable(_) => "validation",
            ApiError::QuotaExceeded(_) => "quota_exceeded",
            ApiError::ConfirmationRequired(_) => "confirmation_required",
            ApiError::ServiceUnavailable(_) => "config",
            ApiError::BadGateway(_) => "upstream",
            ApiError::Internal(err) => err.kind(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::QuotaExceeded(msg)
            | ApiError::ConfirmationRequired(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::BadGateway(msg) => msg.clone(),
            ApiError::Internal(err) => err.to_string(),
        }
    }

    /// JSON body shared by plain responses and SSE error events.
    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": self.message(),
            "code": self.code(),
        })
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Validation(msg) => ApiError::Unprocessable(msg),
            Error::QuotaExceeded(msg) => ApiError::QuotaExceeded(msg),
            Error::ConfirmationRequired(msg) => ApiError::ConfirmationRequired(msg),
            Error::Config(msg) => ApiError::ServiceUnavailable(msg),
            err @ (Error::Inference(_) | Error::Request(_)) => ApiError::BadGateway(err.to_string()),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), code = self.code(), error = %self.message(), "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
