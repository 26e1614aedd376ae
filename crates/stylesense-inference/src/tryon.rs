//! Sequential virtual try-on.
//!
//! Garments are layered one at a time onto a base photo. The composite
//! returned by step `i` is the base image for step `i + 1`, so a run is
//! strictly sequential and order-sensitive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use stylesense_core::defaults::{
    ENV_TRYON_BACKOFF_MS, ENV_TRYON_STEP_DELAY_MS, TRYON_BACKOFF_MS, TRYON_STEP_DELAY,
};
use stylesense_core::logging::{
    ATTEMPT, BACKOFF_MS, COMPONENT, DURATION_MS, ERROR_KIND, ERROR_MSG, MODEL, OPERATION, STEP,
    SUBSYSTEM, TOTAL,
};
use stylesense_core::{
    EncodedImage, Error, ImageCompositionBackend, Result, StepStage, TryOnGarment, TryOnProgress,
    TryOnResult,
};

/// Pacing for a try-on run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnConfig {
    /// Pause before every step after the first.
    pub step_delay: Duration,
    /// Wait before each retry of a quota-limited step. Its length is the
    /// retry budget per step.
    pub backoff: Vec<Duration>,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            step_delay: TRYON_STEP_DELAY,
            backoff: TRYON_BACKOFF_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

impl TryOnConfig {
    /// Load from `TRYON_STEP_DELAY_MS` and `TRYON_BACKOFF_MS` (a comma
    /// separated list of milliseconds). Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = std::env::var(ENV_TRYON_STEP_DELAY_MS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.step_delay = Duration::from_millis(ms);
        }

        if let Ok(raw) = std::env::var(ENV_TRYON_BACKOFF_MS) {
            match parse_backoff(&raw) {
                Some(backoff) => config.backoff = backoff,
                None => warn!(
                    { SUBSYSTEM } = "inference",
                    { COMPONENT } = "tryon",
                    value = %raw,
                    "Ignoring malformed {}",
                    ENV_TRYON_BACKOFF_MS
                ),
            }
        }

        config
    }

    /// Total attempts allowed for one step.
    pub fn max_attempts(&self) -> usize {
        self.backoff.len() + 1
    }
}

fn parse_backoff(raw: &str) -> Option<Vec<Duration>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().ok().map(Duration::from_millis))
        .collect()
}

/// Instruction sent with each layering step. It names the garment and the
/// step so the model adds a layer instead of replacing the outfit.
pub fn layer_instruction(garment: &TryOnGarment, step: usize, total: usize) -> String {
    format!(
        "Perform a virtual try-on. Overlay the garment from the second image onto the person in the first image. \
         Layering {} ({}) onto the person, keeping every garment already applied in place. \
         Step {} of {}. Ensure realistic draping and fit.",
        garment.category, garment.color, step, total
    )
}

/// Runs the layering pipeline against an image composition backend.
pub struct TryOnCompositor<B: ?Sized> {
    backend: Arc<B>,
    config: TryOnConfig,
}

impl<B: ImageCompositionBackend + ?Sized> TryOnCompositor<B> {
    pub fn new(backend: Arc<B>, config: TryOnConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &TryOnConfig {
        &self.config
    }

    /// Layer `garments` onto `base` in the given order.
    ///
    /// `on_progress` sees a `Started` event before each external call and a
    /// `Completed` event after it. The run is all-or-nothing: any error
    /// discards the partial composite.
    pub async fn run<F>(
        &self,
        base: EncodedImage,
        garments: &[TryOnGarment],
        mut on_progress: F,
    ) -> Result<TryOnResult>
    where
        F: FnMut(TryOnProgress) + Send,
    {
        if garments.is_empty() {
            return Err(Error::InvalidInput(
                "Select at least one garment to try on".to_string(),
            ));
        }

        let total = garments.len();
        let start = Instant::now();
        let mut composite = base;
        let mut layers_applied = 0;
        let mut layers_skipped = Vec::new();

        info!(
            { SUBSYSTEM } = "inference",
            { COMPONENT } = "tryon",
            { OPERATION } = "run",
            { TOTAL } = total,
            { MODEL } = self.backend.image_model(),
            "Try-on run started"
        );

        for (index, garment) in garments.iter().enumerate() {
            let step = index + 1;
            on_progress(TryOnProgress {
                current: step,
                total,
                stage: StepStage::Started,
            });

            if step > 1 {
                tokio::time::sleep(self.config.step_delay).await;
            }

            let instruction = layer_instruction(garment, step, total);
            match self.apply_layer(&composite, garment, &instruction, step, total).await? {
                Some(image) => {
                    composite = image;
                    layers_applied += 1;
                }
                None => {
                    warn!(
                        { SUBSYSTEM } = "inference",
                        { COMPONENT } = "tryon",
                        { OPERATION } = "layer_skipped",
                        { STEP } = step,
                        { TOTAL } = total,
                        category = %garment.category,
                        "Response carried no image, keeping previous composite"
                    );
                    layers_skipped.push(step);
                }
            }

            on_progress(TryOnProgress {
                current: step,
                total,
                stage: StepStage::Completed,
            });
        }

        info!(
            { SUBSYSTEM } = "inference",
            { COMPONENT } = "tryon",
            { OPERATION } = "run",
            { TOTAL } = total,
            layers_applied,
            layers_skipped = layers_skipped.len(),
            { DURATION_MS } = start.elapsed().as_millis() as u64,
            "Try-on run completed"
        );

        Ok(TryOnResult {
            composite,
            layers_applied,
            layers_skipped,
        })
    }

    /// One step, retrying quota failures over the backoff table.
    async fn apply_layer(
        &self,
        composite: &EncodedImage,
        garment: &TryOnGarment,
        instruction: &str,
        step: usize,
        total: usize,
    ) -> Result<Option<EncodedImage>> {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;

        loop {
            match self
                .backend
                .compose_images(composite, &garment.image, instruction)
                .await
            {
                Ok(image) => {
                    debug!(
                        { SUBSYSTEM } = "inference",
                        { COMPONENT } = "tryon",
                        { STEP } = step,
                        { TOTAL } = total,
                        { ATTEMPT } = attempt,
                        has_image = image.is_some(),
                        "Layer composed"
                    );
                    return Ok(image);
                }
                Err(Error::QuotaExceeded(msg)) if attempt < max_attempts => {
                    let backoff = self.config.backoff[attempt - 1];
                    warn!(
                        { SUBSYSTEM } = "inference",
                        { COMPONENT } = "tryon",
                        { STEP } = step,
                        { TOTAL } = total,
                        { ATTEMPT } = attempt,
                        { BACKOFF_MS } = backoff.as_millis() as u64,
                        { ERROR_MSG } = %msg,
                        "Quota exceeded, retrying layer"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(Error::QuotaExceeded(msg)) => {
                    warn!(
                        { SUBSYSTEM } = "inference",
                        { COMPONENT } = "tryon",
                        { STEP } = step,
                        { TOTAL } = total,
                        { ATTEMPT } = attempt,
                        { ERROR_MSG } = %msg,
                        "Quota exceeded, retries exhausted"
                    );
                    return Err(Error::QuotaExceeded(format!(
                        "Layer {} of {} ({}) failed after {} attempts: {}. Connect a higher-tier API key to continue.",
                        step, total, garment.category, attempt, msg
                    )));
                }
                Err(e) => {
                    warn!(
                        { SUBSYSTEM } = "inference",
                        { COMPONENT } = "tryon",
                        { STEP } = step,
                        { TOTAL } = total,
                        { ATTEMPT } = attempt,
                        { ERROR_KIND } = e.kind(),
                        { ERROR_MSG } = %e,
                        "Layer failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garment(category: &str, color: &str) -> TryOnGarment {
        TryOnGarment {
            image: EncodedImage::new("image/png", "AAAA"),
            category: category.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = TryOnConfig::default();
        assert_eq!(config.step_delay, Duration::from_millis(1500));
        assert_eq!(
            config.backoff,
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
        assert_eq!(config.max_attempts(), 3);
    }

    #[test]
    fn test_parse_backoff() {
        assert_eq!(
            parse_backoff("100, 200"),
            Some(vec![Duration::from_millis(100), Duration::from_millis(200)])
        );
        assert_eq!(parse_backoff(""), Some(vec![]));
        assert_eq!(parse_backoff("100,abc"), None);
    }

    #[test]
    fn test_layer_instruction_names_garment_and_step() {
        let instruction = layer_instruction(&garment("jacket", "olive"), 2, 3);
        assert!(instruction.contains("jacket (olive)"));
        assert!(instruction.contains("Step 2 of 3"));
        assert!(instruction.contains("keeping every garment already applied in place"));
    }
}
