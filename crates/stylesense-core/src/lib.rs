//! # stylesense-core
//!
//! Core types, traits, and abstractions for stylesense.
//!
//! This crate provides the data model, the error taxonomy and the trait
//! definitions that the store, inference and API crates depend on.

pub mod defaults;
pub mod error;
pub mod image;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{is_quota_signal, Error, Result};
pub use image::EncodedImage;
pub use models::*;
pub use traits::*;
