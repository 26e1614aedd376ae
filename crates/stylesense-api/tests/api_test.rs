//! In-process API tests driving the router with `oneshot`.
//!
//! The store is in-memory SQLite; the AI backend is the scripted mock.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use stylesense_api::{build_router, AppState, ServerConfig};
use stylesense_core::{EncodedImage, GarmentRepository};
use stylesense_db::Database;
use stylesense_inference::mock::{
    MockFailure, MockInferenceBackend, MockProvider, MockReply, OP_ANALYZE, OP_COMPOSE,
};
use stylesense_inference::{CredentialTier, TryOnConfig, QUOTA_FALLBACK_ADVICE};

const API_KEY_HEADER: &str = "x-stylesense-api-key";

struct TestApp {
    router: Router,
    db: Database,
    backend: MockInferenceBackend,
}

/// Pacing shortened so retry paths finish quickly on the real clock.
fn fast_tryon() -> TryOnConfig {
    TryOnConfig {
        step_delay: Duration::ZERO,
        backoff: vec![Duration::from_millis(1), Duration::from_millis(1)],
    }
}

async fn app_with(provider: MockProvider, config: ServerConfig) -> TestApp {
    let db = Database::connect_in_memory().await.unwrap();
    let backend = provider.backend().clone();
    let state = AppState::new(db.clone(), Arc::new(provider), fast_tryon());
    TestApp {
        router: build_router(state, &config),
        db,
        backend,
    }
}

async fn app(backend: MockInferenceBackend) -> TestApp {
    app_with(MockProvider::new(backend), ServerConfig::default()).await
}

fn image_uri(label: &str) -> String {
    EncodedImage::from_bytes("image/png", label.as_bytes()).to_data_uri()
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_with_key(uri, body, None).await
    }

    async fn post_with_key(&self, uri: &str, body: Value, key: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::delete(uri).body(Body::empty()).unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn add_garment(&self, category: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/wardrobe",
                json!({
                    "image_data": image_uri(category),
                    "category": category,
                    "color": "black",
                    "tags": "basic"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }
}

// =============================================================================
// System
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app(MockInferenceBackend::new()).await;
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_request_id_header_added() {
    let app = app(MockInferenceBackend::new()).await;
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_credentials_tiers() {
    let app = app(MockInferenceBackend::new()).await;

    let (status, body) = app.get("/api/credentials").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "standard");
    assert_eq!(body["elevated"], false);

    let request = Request::get("/api/credentials")
        .header(API_KEY_HEADER, "my-pro-key")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.send(request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "elevated");
}

#[tokio::test]
async fn test_no_credential_is_service_unavailable() {
    let provider = MockProvider::new(MockInferenceBackend::new()).unconfigured();
    let app = app_with(provider, ServerConfig::default()).await;

    let (status, body) = app.get("/api/credentials").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "config");
}

// =============================================================================
// Wardrobe
// =============================================================================

#[tokio::test]
async fn test_wardrobe_create_and_list_newest_first() {
    let app = app(MockInferenceBackend::new()).await;
    let first = app.add_garment("top").await;
    let second = app.add_garment("bottom").await;

    for uri in ["/api/wardrobe", "/api/wardrobe/"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![second, first]);
    }
}

#[tokio::test]
async fn test_wardrobe_create_rejects_bad_image() {
    let app = app(MockInferenceBackend::new()).await;
    let (status, body) = app
        .post(
            "/api/wardrobe",
            json!({"image_data": "not base64!", "category": "top", "color": "red"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn test_upload_classifies_then_stores() {
    let backend = MockInferenceBackend::new().with_vision_replies([MockReply::Text(
        r#"{"category": "outerwear", "color": "camel", "tags": ["wool", "formal"]}"#.into(),
    )]);
    let app = app(backend).await;

    let (status, body) = app
        .post("/api/wardrobe/upload", json!({"image": image_uri("coat")}))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "outerwear");
    assert_eq!(body["color"], "camel");
    assert_eq!(body["tags"], "wool, formal");
    assert_eq!(body["image_data"], image_uri("coat"));

    let (_, listed) = app.get("/api/wardrobe").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_quota_stores_nothing() {
    let backend =
        MockInferenceBackend::new().with_vision_replies([MockReply::Fail(MockFailure::Quota)]);
    let app = app(backend).await;

    let (status, body) = app
        .post("/api/wardrobe/upload", json!({"image": image_uri("coat")}))
        .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "quota_exceeded");
    let (_, listed) = app.get("/api/wardrobe").await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_schema_mismatch_is_unprocessable() {
    let backend = MockInferenceBackend::new().with_vision_replies([MockReply::Text(
        r#"{"category": "outerwear", "color": "camel"}"#.into(),
    )]);
    let app = app(backend).await;

    let (status, body) = app
        .post("/api/wardrobe/upload", json!({"image": image_uri("coat")}))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn test_classify_does_not_store() {
    let app = app(MockInferenceBackend::new()).await;

    let (status, body) = app
        .post("/api/wardrobe/classify", json!({"image": image_uri("tee")}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "top");
    assert_eq!(body["tags"], json!(["cotton", "casual"]));
    assert_eq!(app.backend.calls_for(OP_ANALYZE).len(), 1);
    let (_, listed) = app.get("/api/wardrobe").await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app(MockInferenceBackend::new()).await;
    let keep = app.add_garment("top").await;
    let gone = app.add_garment("bottom").await;

    for _ in 0..2 {
        let (status, body) = app.delete(&format!("/api/wardrobe/{}", gone)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
    for missing in ["424242", "0", "-5"] {
        let (status, body) = app.delete(&format!("/api/wardrobe/{}", missing)).await;
        assert_eq!(status, StatusCode::OK, "delete of {} should succeed", missing);
        assert_eq!(body["success"], true);
    }

    let (_, listed) = app.get("/api/wardrobe").await;
    let ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![keep]);
}

// =============================================================================
// Outfits
// =============================================================================

#[tokio::test]
async fn test_outfits_create_and_list() {
    let app = app(MockInferenceBackend::new()).await;

    let (status, created) = app
        .post(
            "/api/outfits/",
            json!({"name": "Friday", "description": "Casual office", "items": [3, 1, 2]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listed) = app.get("/api/outfits").await;
    assert_eq!(status, StatusCode::OK);
    let outfit = &listed.as_array().unwrap()[0];
    assert_eq!(outfit["id"], created["id"]);
    assert_eq!(outfit["items"], json!([3, 1, 2]));
}

#[tokio::test]
async fn test_outfit_requires_name() {
    let app = app(MockInferenceBackend::new()).await;
    let (status, _) = app.post("/api/outfits", json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Stylist
// =============================================================================

#[tokio::test]
async fn test_stylist_advice() {
    let backend = MockInferenceBackend::new()
        .with_generation_replies([MockReply::Text("Style Score: 88".into())]);
    let app = app(backend).await;
    app.add_garment("bottom").await;

    let (status, body) = app
        .post("/api/stylist", json!({"query": "Weekend brunch?"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["advice"], "Style Score: 88");
    assert_eq!(body["degraded"], false);
    let prompt = &app.backend.calls()[0].prompt;
    assert!(prompt.contains("- bottom (black): basic"));
}

#[tokio::test]
async fn test_stylist_quota_degrades() {
    let backend = MockInferenceBackend::new()
        .with_generation_replies([MockReply::Fail(MockFailure::Quota)]);
    let app = app(backend).await;

    let (status, body) = app
        .post("/api/stylist", json!({"query": "Weekend brunch?"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["advice"], QUOTA_FALLBACK_ADVICE);
    assert_eq!(body["degraded"], true);
}

#[tokio::test]
async fn test_stylist_blank_query() {
    let app = app(MockInferenceBackend::new()).await;
    let (status, _) = app.post("/api/stylist", json!({"query": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.backend.total_call_count(), 0);
}

// =============================================================================
// Try-on
// =============================================================================

#[tokio::test]
async fn test_try_on_layers_in_request_order() {
    let app = app(MockInferenceBackend::new()).await;
    let top = app.add_garment("top").await;
    let bottom = app.add_garment("bottom").await;
    let base = image_uri("person");

    let (status, body) = app
        .post(
            "/api/try-on",
            json!({
                "base_photo": base,
                "garment_ids": [bottom, top],
                "confirm_multi_layer": true
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["layers_applied"], 2);
    assert_eq!(body["layers_skipped"], json!([]));
    assert_eq!(
        body["image"],
        MockInferenceBackend::default_composite(2).to_data_uri()
    );

    let calls = app.backend.calls_for(OP_COMPOSE);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].inputs[0].to_data_uri(), base);
    assert_eq!(calls[0].inputs[1].to_data_uri(), image_uri("bottom"));
    assert_eq!(calls[1].inputs[0], MockInferenceBackend::default_composite(1));
    assert_eq!(calls[1].inputs[1].to_data_uri(), image_uri("top"));
}

#[tokio::test]
async fn test_try_on_multi_layer_needs_confirmation() {
    let app = app(MockInferenceBackend::new()).await;
    let top = app.add_garment("top").await;
    let bottom = app.add_garment("bottom").await;
    let request = json!({"base_photo": image_uri("person"), "garment_ids": [top, bottom]});

    let (status, body) = app.post("/api/try-on", request.clone()).await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(body["code"], "confirmation_required");
    assert_eq!(app.backend.compose_call_count(), 0);

    // A caller-supplied key is elevated and skips the prompt.
    let (status, _) = app
        .post_with_key("/api/try-on", request, Some("my-pro-key"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.backend.compose_call_count(), 2);
}

#[tokio::test]
async fn test_try_on_elevated_provider_skips_confirmation() {
    let provider =
        MockProvider::new(MockInferenceBackend::new()).with_tier(CredentialTier::Elevated);
    let app = app_with(provider, ServerConfig::default()).await;
    let top = app.add_garment("top").await;
    let bottom = app.add_garment("bottom").await;

    let (status, _) = app
        .post(
            "/api/try-on",
            json!({"base_photo": image_uri("person"), "garment_ids": [top, bottom]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_try_on_rejects_before_any_ai_call() {
    let app = app(MockInferenceBackend::new()).await;
    let top = app.add_garment("top").await;

    let (status, _) = app
        .post(
            "/api/try-on",
            json!({"base_photo": image_uri("person"), "garment_ids": []}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/try-on",
            json!({"base_photo": image_uri("person"), "garment_ids": [top, 9999], "confirm_multi_layer": true}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    assert_eq!(app.backend.total_call_count(), 0);
}

#[tokio::test]
async fn test_try_on_quota_exhaustion() {
    let backend = MockInferenceBackend::new().with_compose_replies([
        MockReply::Fail(MockFailure::Quota),
        MockReply::Fail(MockFailure::Quota),
        MockReply::Fail(MockFailure::Quota),
    ]);
    let app = app(backend).await;
    let top = app.add_garment("top").await;

    let (status, body) = app
        .post(
            "/api/try-on",
            json!({"base_photo": image_uri("person"), "garment_ids": [top]}),
        )
        .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("Layer 1 of 1"));
    assert_eq!(app.backend.compose_call_count(), 3);
}

#[tokio::test]
async fn test_try_on_stream_reports_progress_then_result() {
    let app = app(MockInferenceBackend::new()).await;
    let top = app.add_garment("top").await;
    let bottom = app.add_garment("bottom").await;

    let request = Request::post("/api/try-on/stream")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "base_photo": image_uri("person"),
                "garment_ids": [bottom, top],
                "confirm_multi_layer": true
            })
            .to_string(),
        ))
        .unwrap();
    let (status, bytes) = app.send(request).await;
    let text = String::from_utf8(bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text.matches("event: progress").count(), 4);
    assert!(text.contains(r#"{"current":2,"total":2,"stage":"completed"}"#));
    let result_at = text.find("event: result").unwrap();
    assert!(result_at > text.rfind("event: progress").unwrap());
    assert!(text.contains(&MockInferenceBackend::default_composite(2).to_data_uri()));
}

#[tokio::test]
async fn test_try_on_stream_reports_error_event() {
    let backend = MockInferenceBackend::new()
        .with_compose_replies([MockReply::Fail(MockFailure::Unclassified)]);
    let app = app(backend).await;
    let top = app.add_garment("top").await;

    let request = Request::post("/api/try-on/stream")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"base_photo": image_uri("person"), "garment_ids": [top]}).to_string(),
        ))
        .unwrap();
    let (status, bytes) = app.send(request).await;
    let text = String::from_utf8(bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("event: error"));
    assert!(text.contains(r#""code":"upstream""#));
    assert!(!text.contains("event: result"));
}

#[tokio::test]
async fn test_try_on_stream_validation_is_plain_error() {
    let app = app(MockInferenceBackend::new()).await;
    let (status, body) = app
        .post(
            "/api/try-on/stream",
            json!({"base_photo": image_uri("person"), "garment_ids": [1234]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

// =============================================================================
// Middleware and static assets
// =============================================================================

#[tokio::test]
async fn test_body_limit() {
    let config = ServerConfig {
        body_limit_bytes: 1024,
        ..Default::default()
    };
    let app = app_with(MockProvider::new(MockInferenceBackend::new()), config).await;

    let big = "A".repeat(4096);
    let (status, _) = app
        .post("/api/wardrobe/classify", json!({"image": big}))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_spa_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>stylesense</html>").unwrap();
    let config = ServerConfig {
        static_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let app = app_with(MockProvider::new(MockInferenceBackend::new()), config).await;

    let request = Request::get("/closet/outfits").body(Body::empty()).unwrap();
    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"<html>stylesense</html>");

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_store_is_shared_with_router() {
    let app = app(MockInferenceBackend::new()).await;
    app.add_garment("top").await;
    assert_eq!(app.db.garments.list().await.unwrap().len(), 1);
}
