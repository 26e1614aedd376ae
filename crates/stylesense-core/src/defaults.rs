//! Default values and environment variable names shared across crates.

use std::time::Duration;

// ─── Images ────────────────────────────────────────────────────────────────

/// MIME type assumed for bare base64 payloads that cannot be sniffed.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Fallback label the ingestion path stores for a blank category or color.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Separator used when persisting classifier tags as a single column.
pub const TAG_SEPARATOR: &str = ", ";

// ─── Try-on pacing ─────────────────────────────────────────────────────────

/// Pause inserted before every layering step after the first.
pub const TRYON_STEP_DELAY: Duration = Duration::from_millis(1500);

/// Backoff before each retry of a quota-limited layering step.
pub const TRYON_BACKOFF_MS: [u64; 2] = [2000, 4000];

pub const ENV_TRYON_STEP_DELAY_MS: &str = "TRYON_STEP_DELAY_MS";
pub const ENV_TRYON_BACKOFF_MS: &str = "TRYON_BACKOFF_MS";

// ─── Gemini ────────────────────────────────────────────────────────────────

pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_TEXT_MODEL: &str = "gemini-flash-latest";
pub const GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const GEMINI_IMAGE_ASPECT_RATIO: &str = "3:4";
pub const GEMINI_TIMEOUT_SECS: u64 = 120;

pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_PRO_API_KEY: &str = "GEMINI_PRO_API_KEY";
pub const ENV_GEMINI_TEXT_MODEL: &str = "GEMINI_TEXT_MODEL";
pub const ENV_GEMINI_IMAGE_MODEL: &str = "GEMINI_IMAGE_MODEL";
pub const ENV_GEMINI_IMAGE_ASPECT_RATIO: &str = "GEMINI_IMAGE_ASPECT_RATIO";
pub const ENV_GEMINI_TIMEOUT: &str = "GEMINI_TIMEOUT";

/// Header a client uses to supply its own (elevated) API key per request.
pub const API_KEY_HEADER: &str = "x-stylesense-api-key";

// ─── Server ────────────────────────────────────────────────────────────────

pub const DATABASE_URL: &str = "sqlite:stylesense.db?mode=rwc";
pub const HOST: &str = "0.0.0.0";
pub const PORT: u16 = 3000;

/// Uploaded photos arrive inline as base64, so bodies are large.
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;
