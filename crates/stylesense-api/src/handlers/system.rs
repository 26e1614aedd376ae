//! Health and credential status.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use stylesense_inference::CredentialTier;

use super::resolve_backend;
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    pub tier: CredentialTier,
    pub elevated: bool,
}

/// Which credential tier a request with these headers would use.
///
/// Returns 503 when no key is configured and none was supplied, so the
/// client can prompt the user to connect one.
pub async fn credentials(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CredentialStatus>, ApiError> {
    let resolved = resolve_backend(&state, &headers)?;
    Ok(Json(CredentialStatus {
        tier: resolved.tier,
        elevated: resolved.tier.is_elevated(),
    }))
}
