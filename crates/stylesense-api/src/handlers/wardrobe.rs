//! Wardrobe endpoints.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use stylesense_core::{
    CreateGarmentRequest, EncodedImage, GarmentAnalysis, GarmentRecord, GarmentRepository,
};
use stylesense_inference::GarmentClassifier;

use super::resolve_backend;
use crate::services::{ingest_garment, label_or_unknown};
use crate::{ApiError, AppState};

/// A photo to classify, as a data URI or bare base64.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn parse_image(raw: &str) -> Result<EncodedImage, ApiError> {
    Ok(EncodedImage::parse(raw)?)
}

pub async fn list_garments(
    State(state): State<AppState>,
) -> Result<Json<Vec<GarmentRecord>>, ApiError> {
    Ok(Json(state.db.garments.list().await?))
}

/// Store a garment whose attributes the client already knows.
pub async fn create_garment(
    State(state): State<AppState>,
    Json(req): Json<CreateGarmentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let image = parse_image(&req.image_data)?;
    let id = state
        .db
        .garments
        .create(CreateGarmentRequest {
            image_data: image.to_data_uri(),
            category: label_or_unknown(&req.category),
            color: label_or_unknown(&req.color),
            tags: req.tags.trim().to_string(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Classify a photo and store it.
pub async fn upload_garment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ImageRequest>,
) -> Result<(StatusCode, Json<GarmentRecord>), ApiError> {
    let image = parse_image(&req.image)?;
    let resolved = resolve_backend(&state, &headers)?;
    let classifier = GarmentClassifier::new(resolved.backend);
    let record = ingest_garment(&state.db.garments, &classifier, &image).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Classify without storing.
pub async fn classify_garment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ImageRequest>,
) -> Result<Json<GarmentAnalysis>, ApiError> {
    let image = parse_image(&req.image)?;
    let resolved = resolve_backend(&state, &headers)?;
    let analysis = GarmentClassifier::new(resolved.backend)
        .classify(&image)
        .await?;
    Ok(Json(analysis))
}

/// Delete a garment. Unknown ids succeed.
pub async fn delete_garment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.db.garments.delete(id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
