//! Shared application state.

use std::sync::Arc;

use stylesense_db::Database;
use stylesense_inference::{BackendProvider, TryOnConfig};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Builds a credential-bound backend per request.
    pub provider: Arc<dyn BackendProvider>,
    pub tryon: TryOnConfig,
}

impl AppState {
    pub fn new(db: Database, provider: Arc<dyn BackendProvider>, tryon: TryOnConfig) -> Self {
        Self {
            db,
            provider,
            tryon,
        }
    }
}
