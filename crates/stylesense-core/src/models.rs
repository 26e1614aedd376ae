//! Data models for the wardrobe, outfits and try-on runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::TAG_SEPARATOR;
use crate::image::EncodedImage;

// =============================================================================
// WARDROBE
// =============================================================================

/// A persisted garment. Immutable after creation except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentRecord {
    pub id: i64,
    /// Data URI of the garment photo.
    pub image_data: String,
    pub category: String,
    pub color: String,
    /// Comma-joined label list.
    pub tags: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new garment; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGarmentRequest {
    pub image_data: String,
    pub category: String,
    pub color: String,
    #[serde(default)]
    pub tags: String,
}

/// Structured attributes derived from a garment photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentAnalysis {
    pub category: String,
    pub color: String,
    pub tags: Vec<String>,
}

impl GarmentAnalysis {
    /// Tags in their persisted comma-joined form.
    pub fn joined_tags(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(TAG_SEPARATOR)
    }
}

// =============================================================================
// OUTFITS
// =============================================================================

/// A saved outfit. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Garment ids in selection order.
    pub items: Vec<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOutfitRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

// =============================================================================
// TRY-ON
// =============================================================================

/// One garment queued for layering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnGarment {
    pub image: EncodedImage,
    pub category: String,
    pub color: String,
}

/// Phase of a layering step a progress event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStage {
    Started,
    Completed,
}

/// "Layering `current` of `total`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryOnProgress {
    pub current: usize,
    pub total: usize,
    pub stage: StepStage,
}

/// Final output of a try-on run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnResult {
    pub composite: EncodedImage,
    pub layers_applied: usize,
    /// 1-indexed steps whose response carried no image and left the
    /// composite unchanged.
    pub layers_skipped: Vec<usize>,
}
