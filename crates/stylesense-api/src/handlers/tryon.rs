//! Virtual try-on endpoints.
//!
//! `POST /api/try-on` answers once the whole run finishes. The `/stream`
//! variant reports progress as Server-Sent Events while the run executes in
//! a spawned task; the task is aborted when the client disconnects.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive};
use axum::response::Sse;
use axum::Json;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use stylesense_core::{InferenceBackend, TryOnProgress, TryOnResult};
use stylesense_inference::TryOnCompositor;

use super::resolve_backend;
use crate::services::{prepare_try_on, PreparedTryOn};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct TryOnRequest {
    /// Photo of the person, as a data URI or bare base64.
    pub base_photo: String,
    /// Garments in layering order. Duplicates are applied again.
    pub garment_ids: Vec<i64>,
    /// Acknowledges the quota risk of a multi-garment run on a standard key.
    #[serde(default)]
    pub confirm_multi_layer: bool,
}

#[derive(Debug, Serialize)]
pub struct TryOnResponse {
    /// Final composite as a data URI.
    pub image: String,
    pub layers_applied: usize,
    pub layers_skipped: Vec<usize>,
}

impl From<TryOnResult> for TryOnResponse {
    fn from(result: TryOnResult) -> Self {
        Self {
            image: result.composite.to_data_uri(),
            layers_applied: result.layers_applied,
            layers_skipped: result.layers_skipped,
        }
    }
}

/// Resolve the credential and the request into a ready compositor run.
async fn prepare(
    state: &AppState,
    headers: &HeaderMap,
    req: &TryOnRequest,
) -> Result<(TryOnCompositor<dyn InferenceBackend>, PreparedTryOn), ApiError> {
    let resolved = resolve_backend(state, headers)?;
    let prepared = prepare_try_on(
        &state.db.garments,
        &req.base_photo,
        &req.garment_ids,
        req.confirm_multi_layer,
        resolved.tier,
    )
    .await?;
    let compositor = TryOnCompositor::new(resolved.backend, state.tryon.clone());
    Ok((compositor, prepared))
}

pub async fn try_on(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TryOnRequest>,
) -> Result<Json<TryOnResponse>, ApiError> {
    let (compositor, prepared) = prepare(&state, &headers, &req).await?;
    let result = compositor
        .run(prepared.base, &prepared.garments, |progress| {
            debug!(
                subsystem = "api",
                component = "tryon",
                step = progress.current,
                total = progress.total,
                stage = ?progress.stage,
                "Try-on progress"
            );
        })
        .await?;
    Ok(Json(result.into()))
}

/// Messages from the running task to the event stream.
enum RunEvent {
    Progress(TryOnProgress),
    Done(Result<TryOnResponse, ApiError>),
}

impl RunEvent {
    fn into_sse(self) -> Event {
        let (name, data) = match self {
            RunEvent::Progress(progress) => ("progress", serde_json::to_string(&progress)),
            RunEvent::Done(Ok(response)) => ("result", serde_json::to_string(&response)),
            RunEvent::Done(Err(err)) => ("error", Ok(err.body().to_string())),
        };
        match data {
            Ok(data) => Event::default().event(name).data(data),
            Err(e) => Event::default()
                .event("error")
                .data(ApiError::Internal(e.into()).body().to_string()),
        }
    }
}

/// Aborts the spawned run when the response stream is dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if !self.0.is_finished() {
            debug!(
                subsystem = "api",
                component = "tryon",
                "Try-on stream closed, aborting run"
            );
            self.0.abort();
        }
    }
}

/// Stream progress as SSE: `progress` events, then one `result` or `error`.
///
/// Validation, confirmation and lookup failures are returned as plain HTTP
/// errors before the stream opens.
pub async fn try_on_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TryOnRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (compositor, prepared) = prepare(&state, &headers, &req).await?;
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let progress_tx = tx.clone();
        let result = compositor
            .run(prepared.base, &prepared.garments, move |progress| {
                // A closed channel means the client left; the abort follows.
                let _ = progress_tx.send(RunEvent::Progress(progress));
            })
            .await
            .map(TryOnResponse::from)
            .map_err(ApiError::from);
        let _ = tx.send(RunEvent::Done(result));
    });

    let stream = futures::stream::unfold(
        (rx, AbortOnDrop(task)),
        |(mut rx, guard)| async move {
            let event = rx.recv().await?;
            Some((Ok(event.into_sse()), (rx, guard)))
        },
    );

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylesense_core::EncodedImage;

    #[test]
    fn test_request_confirm_defaults_false() {
        let req: TryOnRequest =
            serde_json::from_str(r#"{"base_photo": "AAAA", "garment_ids": [2, 1]}"#).unwrap();
        assert!(!req.confirm_multi_layer);
        assert_eq!(req.garment_ids, vec![2, 1]);
    }

    #[test]
    fn test_response_from_result() {
        let response = TryOnResponse::from(TryOnResult {
            composite: EncodedImage::new("image/png", "iVBORw0K"),
            layers_applied: 1,
            layers_skipped: vec![2],
        });
        assert_eq!(response.image, "data:image/png;base64,iVBORw0K");
        assert_eq!(response.layers_skipped, vec![2]);
    }

    #[tokio::test]
    async fn test_abort_on_drop_cancels_task() {
        let (alive_tx, alive_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _alive = alive_tx;
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        drop(AbortOnDrop(handle));

        // The sender is dropped only when the task is torn down.
        assert!(alive_rx.await.is_err());
    }
}
