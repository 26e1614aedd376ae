//! # stylesense-inference
//!
//! AI-backed wardrobe operations for stylesense.
//!
//! This crate provides:
//! - Gemini REST backend implementing the core inference traits
//! - Per-request credential resolution with standard and elevated tiers
//! - Garment classifier (structured output)
//! - Stylist advisor with graceful quota degradation
//! - Sequential try-on compositor with pacing and quota retry
//!
//! # Feature Flags
//!
//! - `mock`: expose [`mock`] to downstream tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stylesense_inference::{
//!     BackendProvider, EncodedImage, GeminiProvider, TryOnCompositor, TryOnConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = GeminiProvider::from_env().unwrap();
//!     let resolved = provider.resolve(None).unwrap();
//!     let compositor = TryOnCompositor::new(resolved.backend, TryOnConfig::default());
//!     let base = EncodedImage::parse("data:image/jpeg;base64,/9j/4AAQ").unwrap();
//!     let result = compositor.run(base, &[], |_| {}).await;
//!     assert!(result.is_err());
//! }
//! ```

pub mod classifier;
pub mod credentials;
pub mod gemini;
pub mod stylist;
pub mod tryon;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use stylesense_core::*;

pub use classifier::{garment_schema, GarmentClassifier, CLASSIFY_PROMPT};
pub use credentials::{
    resolve_credential, BackendProvider, Credential, CredentialTier, GeminiProvider,
    ResolvedBackend,
};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use stylist::{StylistAdvice, StylistAdvisor, QUOTA_FALLBACK_ADVICE};
pub use tryon::{layer_instruction, TryOnCompositor, TryOnConfig};
