//! Gemini inference backend.
//!
//! Talks to the Gemini `generateContent` REST endpoint for all three external
//! calls the app makes:
//!
//! - structured-output garment classification (vision + JSON schema)
//! - free-text styling advice
//! - two-image try-on composition
//!
//! # Example
//!
//! ```rust,no_run
//! use stylesense_inference::gemini::GeminiConfig;
//! use stylesense_inference::{BackendProvider, GeminiProvider, GenerationBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = GeminiProvider::new(GeminiConfig::from_env()).unwrap();
//!     let resolved = provider.resolve(None).unwrap();
//!     let advice = resolved.backend.generate("What goes with navy chinos?").await;
//!     println!("{:?}", advice);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use error::{to_stylesense_error, GeminiErrorCode};
pub use types::*;
