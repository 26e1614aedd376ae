//! Gemini REST backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use stylesense_core::defaults::{
    ENV_GEMINI_API_KEY, ENV_GEMINI_BASE_URL, ENV_GEMINI_IMAGE_ASPECT_RATIO,
    ENV_GEMINI_IMAGE_MODEL, ENV_GEMINI_PRO_API_KEY, ENV_GEMINI_TEXT_MODEL, ENV_GEMINI_TIMEOUT,
    GEMINI_IMAGE_ASPECT_RATIO, GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL, GEMINI_TIMEOUT_SECS,
    GEMINI_URL,
};
use stylesense_core::{
    EncodedImage, Error, GenerationBackend, ImageCompositionBackend, Result, VisionBackend,
};

use super::error::{to_stylesense_error, GeminiErrorCode};
use super::types::*;
use crate::credentials::{Credential, CredentialTier};

/// Configuration for the Gemini backend.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Base URL including the API version, e.g. `.../v1beta`.
    pub base_url: String,
    /// Standard-tier API key.
    pub api_key: Option<String>,
    /// Elevated-tier API key (higher quota).
    pub pro_api_key: Option<String>,
    /// Model for classification and styling advice.
    pub text_model: String,
    /// Model for try-on image composition.
    pub image_model: String,
    /// Requested output aspect ratio for composed images.
    pub image_aspect_ratio: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_URL.to_string(),
            api_key: None,
            pro_api_key: None,
            text_model: GEMINI_TEXT_MODEL.to_string(),
            image_model: GEMINI_IMAGE_MODEL.to_string(),
            image_aspect_ratio: GEMINI_IMAGE_ASPECT_RATIO.to_string(),
            timeout_seconds: GEMINI_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("pro_api_key", &self.pro_api_key.as_ref().map(|_| "<redacted>"))
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("image_aspect_ratio", &self.image_aspect_ratio)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GeminiConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: non_empty_env(ENV_GEMINI_BASE_URL).unwrap_or_else(|| GEMINI_URL.to_string()),
            api_key: non_empty_env(ENV_GEMINI_API_KEY),
            pro_api_key: non_empty_env(ENV_GEMINI_PRO_API_KEY),
            text_model: non_empty_env(ENV_GEMINI_TEXT_MODEL)
                .unwrap_or_else(|| GEMINI_TEXT_MODEL.to_string()),
            image_model: non_empty_env(ENV_GEMINI_IMAGE_MODEL)
                .unwrap_or_else(|| GEMINI_IMAGE_MODEL.to_string()),
            image_aspect_ratio: non_empty_env(ENV_GEMINI_IMAGE_ASPECT_RATIO)
                .unwrap_or_else(|| GEMINI_IMAGE_ASPECT_RATIO.to_string()),
            timeout_seconds: non_empty_env(ENV_GEMINI_TIMEOUT)
                .and_then(|s| s.parse().ok())
                .unwrap_or(GEMINI_TIMEOUT_SECS),
        }
    }
}

/// Gemini backend bound to one resolved credential.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
    credential: Credential,
}

impl GeminiBackend {
    /// Create a backend handle. The HTTP client is shared; the credential is
    /// per handle.
    pub fn new(config: GeminiConfig, credential: Credential, client: Client) -> Self {
        debug!(
            subsystem = "inference",
            component = "gemini",
            tier = credential.tier().as_str(),
            text_model = %config.text_model,
            image_model = %config.image_model,
            "Gemini backend handle created"
        );
        Self {
            client,
            config,
            credential,
        }
    }

    /// Build the shared HTTP client for the given configuration.
    pub fn build_client(config: &GeminiConfig) -> Result<Client> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Gemini client: url={}, text={}, image={}",
            config.base_url, config.text_model, config.image_model
        );
        Ok(client)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn tier(&self) -> CredentialTier {
        self.credential.tier()
    }

    fn model_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url(model));

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credential.api_key())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (api_status, message) = match serde_json::from_str::<GeminiErrorResponse>(&body) {
                Ok(envelope) => (
                    envelope.error.status.unwrap_or_default(),
                    envelope.error.message,
                ),
                Err(_) => (String::new(), body),
            };
            let code = GeminiErrorCode::from_response(status.as_u16(), &api_status, &message);
            warn!(
                subsystem = "inference",
                component = "gemini",
                model,
                status = status.as_u16(),
                error_kind = ?code,
                duration_ms = start.elapsed().as_millis() as u64,
                "Gemini request failed"
            );
            return Err(to_stylesense_error(
                code,
                &format!("Gemini returned {}: {}", status, message),
            ));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse Gemini response: {}", e)))?;

        debug!(
            subsystem = "inference",
            component = "gemini",
            model,
            candidates = result.candidates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Gemini request complete"
        );
        Ok(result)
    }
}

#[async_trait]
impl VisionBackend for GeminiBackend {
    async fn analyze_image(
        &self,
        image: &EncodedImage,
        prompt: &str,
        response_schema: Option<&JsonValue>,
    ) -> Result<Option<String>> {
        let mut request = GenerateContentRequest::user(vec![Part::text(prompt), Part::image(image)]);
        if let Some(schema) = response_schema {
            request = request.with_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema.clone()),
                ..Default::default()
            });
        }

        let response = self
            .generate_content(&self.config.text_model, &request)
            .await?;
        Ok(response.text())
    }

    fn vision_model(&self) -> &str {
        &self.config.text_model
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            subsystem = "inference",
            component = "gemini",
            op = "generate",
            prompt_len = prompt.len(),
            "Generating text"
        );
        let request = GenerateContentRequest::user(vec![Part::text(prompt)]);
        let response = self
            .generate_content(&self.config.text_model, &request)
            .await?;
        response
            .text()
            .ok_or_else(|| Error::Inference("Gemini returned no text".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.text_model
    }
}

#[async_trait]
impl ImageCompositionBackend for GeminiBackend {
    async fn compose_images(
        &self,
        base: &EncodedImage,
        overlay: &EncodedImage,
        instruction: &str,
    ) -> Result<Option<EncodedImage>> {
        let request = GenerateContentRequest::user(vec![
            Part::image(base),
            Part::image(overlay),
            Part::text(instruction),
        ])
        .with_config(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: self.config.image_aspect_ratio.clone(),
            }),
            ..Default::default()
        });

        let response = self
            .generate_content(&self.config.image_model, &request)
            .await?;
        Ok(response.first_image())
    }

    fn image_model(&self) -> &str {
        &self.config.image_model
    }
}
