//! Conversational styling advice over the current wardrobe.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use stylesense_core::{Error, GarmentRecord, GenerationBackend, Result};

/// Returned in place of advice when the usage quota is exhausted.
pub const QUOTA_FALLBACK_ADVICE: &str = "I'm getting a lot of styling requests right now and have hit my usage limit. Give me a minute and ask again, or connect a higher-tier API key for uninterrupted advice.";

/// Advice text plus whether it is the canned quota fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylistAdvice {
    pub advice: String,
    pub degraded: bool,
}

/// One line per garment: category, color and tags. Images are never sent.
pub fn wardrobe_context(wardrobe: &[GarmentRecord]) -> String {
    if wardrobe.is_empty() {
        return "(the wardrobe is empty)".to_string();
    }
    wardrobe
        .iter()
        .map(|item| format!("- {} ({}): {}", item.category, item.color, item.tags))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(query: &str, wardrobe: &[GarmentRecord]) -> String {
    format!(
        r#"You are StyleSense, an expert AI fashion stylist.
The user's current wardrobe consists of:
{context}

User Query: "{query}"

Suggest a complete outfit from their wardrobe or recommend what they should buy to "complete the look".
Provide a "Style Score" (1-100) and "Cost-Per-Wear" prediction.
Be encouraging and fashion-forward."#,
        context = wardrobe_context(wardrobe),
        query = query.trim(),
    )
}

/// Produces free-text outfit advice. A quota failure degrades to
/// [`QUOTA_FALLBACK_ADVICE`]; every other failure propagates.
pub struct StylistAdvisor<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: GenerationBackend + ?Sized> StylistAdvisor<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn advise(&self, query: &str, wardrobe: &[GarmentRecord]) -> Result<StylistAdvice> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("Query cannot be empty".to_string()));
        }

        let prompt = build_prompt(query, wardrobe);
        match self.backend.generate(&prompt).await {
            Ok(advice) => {
                debug!(
                    subsystem = "inference",
                    component = "stylist",
                    op = "advise",
                    model = self.backend.model_name(),
                    wardrobe_size = wardrobe.len(),
                    response_len = advice.len(),
                    "Stylist advice generated"
                );
                Ok(StylistAdvice {
                    advice,
                    degraded: false,
                })
            }
            Err(e) if e.is_quota_exceeded() => {
                warn!(
                    subsystem = "inference",
                    component = "stylist",
                    error = %e,
                    "Stylist quota exhausted, returning fallback advice"
                );
                Ok(StylistAdvice {
                    advice: QUOTA_FALLBACK_ADVICE.to_string(),
                    degraded: true,
                })
            }
            Err(e) => Err(e),
        }
    }
}
