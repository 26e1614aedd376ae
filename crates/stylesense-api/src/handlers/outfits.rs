//! Saved outfit endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use stylesense_core::{CreateOutfitRequest, Error, OutfitRecord, OutfitRepository};

use super::wardrobe::CreatedResponse;
use crate::{ApiError, AppState};

pub async fn list_outfits(
    State(state): State<AppState>,
) -> Result<Json<Vec<OutfitRecord>>, ApiError> {
    Ok(Json(state.db.outfits.list().await?))
}

pub async fn create_outfit(
    State(state): State<AppState>,
    Json(req): Json<CreateOutfitRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(Error::InvalidInput("Outfit name cannot be empty".to_string()).into());
    }
    let id = state.db.outfits.create(req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}
