//! Scripted inference backend for deterministic testing.
//!
//! Each operation has its own reply queue. When a queue is empty a default
//! reply is used: valid classifier JSON for vision calls, `"Mock advice"` for
//! generation, and an image whose bytes are `composite-{n}` for the n-th
//! composition call.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use stylesense_inference::mock::{MockFailure, MockInferenceBackend, MockReply};
//! use stylesense_inference::ImageCompositionBackend;
//! use stylesense_inference::EncodedImage;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockInferenceBackend::new()
//!         .with_compose_replies([MockReply::Fail(MockFailure::Quota)]);
//!     let base = EncodedImage::new("image/png", "AAAA");
//!     assert!(backend.compose_images(&base, &base, "layer").await.is_err());
//!     assert!(backend.compose_images(&base, &base, "layer").await.is_ok());
//!     assert_eq!(backend.compose_call_count(), 2);
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::time::Instant;

use stylesense_core::{
    EncodedImage, Error, GenerationBackend, ImageCompositionBackend, Result, VisionBackend,
};

use crate::credentials::{BackendProvider, CredentialTier, ResolvedBackend};

pub const OP_ANALYZE: &str = "analyze_image";
pub const OP_GENERATE: &str = "generate";
pub const OP_COMPOSE: &str = "compose_images";

pub const DEFAULT_ANALYSIS: &str =
    r#"{"category": "top", "color": "white", "tags": ["cotton", "casual"]}"#;
pub const DEFAULT_ADVICE: &str = "Mock advice";

/// Failure classes a scripted reply can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Quota,
    Unclassified,
    Validation,
}

impl MockFailure {
    fn to_error(self) -> Error {
        match self {
            MockFailure::Quota => {
                Error::QuotaExceeded("Resource has been exhausted (e.g. check quota).".to_string())
            }
            MockFailure::Unclassified => Error::Inference("Upstream returned 500".to_string()),
            MockFailure::Validation => Error::Validation("Malformed upstream reply".to_string()),
        }
    }
}

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Image(EncodedImage),
    /// A successful response with no usable payload.
    Empty,
    Fail(MockFailure),
}

/// A recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: &'static str,
    /// Images in the order they were sent.
    pub inputs: Vec<EncodedImage>,
    pub prompt: String,
    /// Tokio clock, so paused-clock tests can assert on pacing.
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockState {
    vision: VecDeque<MockReply>,
    generation: VecDeque<MockReply>,
    compose: VecDeque<MockReply>,
    calls: Vec<MockCall>,
}

/// Mock backend implementing every inference trait.
#[derive(Clone, Default)]
pub struct MockInferenceBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockInferenceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vision_replies(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        self.state.lock().unwrap().vision.extend(replies);
        self
    }

    pub fn with_generation_replies(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        self.state.lock().unwrap().generation.extend(replies);
        self
    }

    pub fn with_compose_replies(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        self.state.lock().unwrap().compose.extend(replies);
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, operation: &str) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .collect()
    }

    pub fn compose_call_count(&self) -> usize {
        self.calls_for(OP_COMPOSE).len()
    }

    pub fn total_call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// The image the n-th (1-based) default composition reply carries.
    pub fn default_composite(n: usize) -> EncodedImage {
        EncodedImage::from_bytes("image/png", format!("composite-{}", n).as_bytes())
    }

    /// Record the call and pop the next scripted reply, if any.
    fn record(
        &self,
        operation: &'static str,
        inputs: Vec<EncodedImage>,
        prompt: &str,
    ) -> (Option<MockReply>, usize) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall {
            operation,
            inputs,
            prompt: prompt.to_string(),
            at: Instant::now(),
        });
        let count = state
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count();
        let reply = match operation {
            OP_ANALYZE => state.vision.pop_front(),
            OP_GENERATE => state.generation.pop_front(),
            _ => state.compose.pop_front(),
        };
        (reply, count)
    }
}

fn unexpected(operation: &str, reply: &MockReply) -> Error {
    Error::Internal(format!("Mock reply {:?} is not valid for {}", reply, operation))
}

#[async_trait]
impl VisionBackend for MockInferenceBackend {
    async fn analyze_image(
        &self,
        image: &EncodedImage,
        prompt: &str,
        _response_schema: Option<&JsonValue>,
    ) -> Result<Option<String>> {
        let (reply, _) = self.record(OP_ANALYZE, vec![image.clone()], prompt);
        match reply {
            None => Ok(Some(DEFAULT_ANALYSIS.to_string())),
            Some(MockReply::Text(text)) => Ok(Some(text)),
            Some(MockReply::Empty) => Ok(None),
            Some(MockReply::Fail(failure)) => Err(failure.to_error()),
            Some(other) => Err(unexpected(OP_ANALYZE, &other)),
        }
    }

    fn vision_model(&self) -> &str {
        "mock-vision"
    }
}

#[async_trait]
impl GenerationBackend for MockInferenceBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let (reply, _) = self.record(OP_GENERATE, Vec::new(), prompt);
        match reply {
            None => Ok(DEFAULT_ADVICE.to_string()),
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Empty) => Err(Error::Inference("Empty response".to_string())),
            Some(MockReply::Fail(failure)) => Err(failure.to_error()),
            Some(other) => Err(unexpected(OP_GENERATE, &other)),
        }
    }

    fn model_name(&self) -> &str {
        "mock-text"
    }
}

#[async_trait]
impl ImageCompositionBackend for MockInferenceBackend {
    async fn compose_images(
        &self,
        base: &EncodedImage,
        overlay: &EncodedImage,
        instruction: &str,
    ) -> Result<Option<EncodedImage>> {
        let (reply, count) =
            self.record(OP_COMPOSE, vec![base.clone(), overlay.clone()], instruction);
        match reply {
            None => Ok(Some(Self::default_composite(count))),
            Some(MockReply::Image(image)) => Ok(Some(image)),
            Some(MockReply::Empty) => Ok(None),
            Some(MockReply::Fail(failure)) => Err(failure.to_error()),
            Some(other) => Err(unexpected(OP_COMPOSE, &other)),
        }
    }

    fn image_model(&self) -> &str {
        "mock-image"
    }
}

/// Provider handing out one shared mock backend.
///
/// A request-supplied key resolves to the elevated tier, as with the real
/// provider.
#[derive(Clone)]
pub struct MockProvider {
    backend: MockInferenceBackend,
    tier: Option<CredentialTier>,
}

impl MockProvider {
    pub fn new(backend: MockInferenceBackend) -> Self {
        Self {
            backend,
            tier: Some(CredentialTier::Standard),
        }
    }

    pub fn with_tier(mut self, tier: CredentialTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// No configured key: resolving without a request key fails.
    pub fn unconfigured(mut self) -> Self {
        self.tier = None;
        self
    }

    pub fn backend(&self) -> &MockInferenceBackend {
        &self.backend
    }
}

impl BackendProvider for MockProvider {
    fn resolve(&self, request_key: Option<&str>) -> Result<ResolvedBackend> {
        let has_request_key = request_key.is_some_and(|k| !k.trim().is_empty());
        let tier = if has_request_key {
            CredentialTier::Elevated
        } else {
            self.tier
                .ok_or_else(|| Error::Config("No Gemini API key configured".to_string()))?
        };
        Ok(ResolvedBackend {
            backend: Arc::new(self.backend.clone()),
            tier,
        })
    }
}
