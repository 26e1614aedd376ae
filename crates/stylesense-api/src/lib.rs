//! # stylesense-api
//!
//! HTTP surface for stylesense: wardrobe management, garment classification,
//! stylist chat and virtual try-on.
//!
//! [`build_router`] assembles the routes and middleware; `main.rs` wires in
//! the SQLite store and the Gemini provider.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;
pub mod telemetry;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use stylesense_core::defaults::API_KEY_HEADER;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

use handlers::{outfits, stylist, system, tryon, wardrobe};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// All API routes plus middleware. When `config.static_dir` is set, unmatched
/// paths fall through to the SPA bundle with `index.html` as fallback.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(system::health))
        .route("/api/credentials", get(system::credentials))
        // Wardrobe
        .route(
            "/api/wardrobe",
            get(wardrobe::list_garments).post(wardrobe::create_garment),
        )
        .route(
            "/api/wardrobe/",
            get(wardrobe::list_garments).post(wardrobe::create_garment),
        )
        .route("/api/wardrobe/upload", post(wardrobe::upload_garment))
        .route("/api/wardrobe/classify", post(wardrobe::classify_garment))
        .route("/api/wardrobe/:id", delete(wardrobe::delete_garment))
        // Outfits
        .route(
            "/api/outfits",
            get(outfits::list_outfits).post(outfits::create_outfit),
        )
        .route(
            "/api/outfits/",
            get(outfits::list_outfits).post(outfits::create_outfit),
        )
        // AI
        .route("/api/stylist", post(stylist::ask_stylist))
        .route("/api/try-on", post(tryon::try_on))
        .route("/api/try-on/stream", post(tryon::try_on_stream));

    if let Some(dir) = &config.static_dir {
        let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(spa);
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(API_KEY_HEADER),
                ]),
        )
        .layer(CatchPanicLayer::new())
        // Photos arrive inline as base64; the extractor default of 2 MB is too small.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .with_state(state)
}
