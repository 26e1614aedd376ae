//! Structured logging field name constants for stylesense.
//!
//! All crates use these names for `tracing` fields so that log queries work
//! the same way across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback or retry applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | High-volume per-item data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the event: "api", "db", "inference".
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem, e.g. "tryon", "classifier", "pool".
pub const COMPONENT: &str = "component";

/// Logical operation name.
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

pub const GARMENT_ID: &str = "garment_id";
pub const OUTFIT_ID: &str = "outfit_id";

// ─── Try-on fields ─────────────────────────────────────────────────────────

/// 1-indexed layering step.
pub const STEP: &str = "step";

/// Total number of layering steps in the run.
pub const TOTAL: &str = "total";

/// 1-indexed attempt number within a step.
pub const ATTEMPT: &str = "attempt";

/// Backoff applied before the next attempt, in milliseconds.
pub const BACKOFF_MS: &str = "backoff_ms";

// ─── Measurement fields ────────────────────────────────────────────────────

pub const DURATION_MS: &str = "duration_ms";
pub const RESULT_COUNT: &str = "result_count";
pub const PROMPT_LEN: &str = "prompt_len";
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

pub const MODEL: &str = "model";

/// Credential tier used for a request: "standard" or "elevated".
pub const TIER: &str = "tier";

// ─── Outcome fields ────────────────────────────────────────────────────────

pub const SUCCESS: &str = "success";
pub const ERROR_MSG: &str = "error";
pub const ERROR_KIND: &str = "error_kind";
