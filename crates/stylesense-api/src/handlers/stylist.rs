//! Stylist chat endpoint.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use stylesense_core::GarmentRepository;
use stylesense_inference::{StylistAdvice, StylistAdvisor};

use super::resolve_backend;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct StylistRequest {
    pub query: String,
}

/// Advice over the current wardrobe. A quota failure still answers 200
/// with `degraded: true`.
pub async fn ask_stylist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StylistRequest>,
) -> Result<Json<StylistAdvice>, ApiError> {
    let resolved = resolve_backend(&state, &headers)?;
    let wardrobe = state.db.garments.list().await?;
    let advice = StylistAdvisor::new(resolved.backend)
        .advise(&req.query, &wardrobe)
        .await?;
    Ok(Json(advice))
}
