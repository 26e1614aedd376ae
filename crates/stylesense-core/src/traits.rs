//! Core traits for stylesense abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::image::EncodedImage;
use crate::models::*;

// =============================================================================
// STORE TRAITS
// =============================================================================

/// Garment persistence. Pure CRUD, no business logic.
#[async_trait]
pub trait GarmentRepository: Send + Sync {
    /// Insert a garment and return its store-assigned id.
    async fn create(&self, req: CreateGarmentRequest) -> Result<i64>;

    /// List all garments, newest first.
    async fn list(&self) -> Result<Vec<GarmentRecord>>;

    /// Fetch one garment, `None` if the id is unknown.
    async fn get(&self, id: i64) -> Result<Option<GarmentRecord>>;

    /// Delete a garment. Deleting an unknown id is not an error.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Outfit persistence.
#[async_trait]
pub trait OutfitRepository: Send + Sync {
    async fn create(&self, req: CreateOutfitRequest) -> Result<i64>;

    /// List all outfits, newest first.
    async fn list(&self) -> Result<Vec<OutfitRecord>>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Vision model call: one image plus an instruction, optionally constrained
/// to a structured-output schema.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Returns the response text, or `None` when the model produced none.
    async fn analyze_image(
        &self,
        image: &EncodedImage,
        prompt: &str,
        response_schema: Option<&JsonValue>,
    ) -> Result<Option<String>>;

    fn vision_model(&self) -> &str;
}

/// Free-text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Image generation from two input images and an instruction.
#[async_trait]
pub trait ImageCompositionBackend: Send + Sync {
    /// Returns the generated image, or `None` when the response carried no
    /// image payload.
    async fn compose_images(
        &self,
        base: &EncodedImage,
        overlay: &EncodedImage,
        instruction: &str,
    ) -> Result<Option<EncodedImage>>;

    fn image_model(&self) -> &str;
}

/// Combined backend supporting every external AI call the app makes.
pub trait InferenceBackend: VisionBackend + GenerationBackend + ImageCompositionBackend {}

impl<T> InferenceBackend for T where
    T: VisionBackend + GenerationBackend + ImageCompositionBackend + ?Sized
{
}
