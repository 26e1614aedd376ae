//! HTTP handlers.

pub mod outfits;
pub mod stylist;
pub mod system;
pub mod tryon;
pub mod wardrobe;

use axum::http::HeaderMap;

use stylesense_core::defaults::API_KEY_HEADER;
use stylesense_inference::ResolvedBackend;

use crate::{ApiError, AppState};

/// Caller-supplied API key, if the request carries one.
pub(crate) fn request_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Backend bound to this request's credential.
pub(crate) fn resolve_backend(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<ResolvedBackend, ApiError> {
    Ok(state.provider.resolve(request_key(headers))?)
}
