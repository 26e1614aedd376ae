//! Garment classification from a single photo.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use stylesense_core::{EncodedImage, Error, GarmentAnalysis, Result, VisionBackend};

/// Fixed instruction sent alongside the garment photo.
pub const CLASSIFY_PROMPT: &str = "Analyze this clothing item. Identify the category (e.g., top, bottom, shoes, accessory), primary color, and descriptive tags (e.g., denim, casual, formal, striped).";

/// Structured-output schema the response must satisfy.
pub fn garment_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": { "type": "STRING" },
            "color": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["category", "color", "tags"]
    })
}

/// Parse a classifier response. Missing or mistyped fields are a hard
/// failure; nothing is defaulted here.
pub fn parse_analysis(text: &str) -> Result<GarmentAnalysis> {
    serde_json::from_str::<GarmentAnalysis>(text.trim())
        .map_err(|e| Error::Validation(format!("Classifier response did not match schema: {}", e)))
}

/// Derives category, color and tags for a garment photo.
///
/// Quota failures are propagated unchanged so the caller can prompt for a
/// higher-tier credential.
pub struct GarmentClassifier<B: ?Sized> {
    backend: Arc<B>,
    schema: JsonValue,
}

impl<B: VisionBackend + ?Sized> GarmentClassifier<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            schema: garment_schema(),
        }
    }

    pub async fn classify(&self, image: &EncodedImage) -> Result<GarmentAnalysis> {
        let start = Instant::now();

        let text = self
            .backend
            .analyze_image(image, CLASSIFY_PROMPT, Some(&self.schema))
            .await
            .inspect_err(|e| {
                warn!(
                    subsystem = "inference",
                    component = "classifier",
                    error_kind = e.kind(),
                    error = %e,
                    "Garment analysis failed"
                );
            })?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Validation("No analysis received from AI".to_string()))?;

        let analysis = parse_analysis(&text)?;

        debug!(
            subsystem = "inference",
            component = "classifier",
            op = "classify",
            model = self.backend.vision_model(),
            category = %analysis.category,
            color = %analysis.color,
            tag_count = analysis.tags.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Garment classified"
        );
        Ok(analysis)
    }
}
