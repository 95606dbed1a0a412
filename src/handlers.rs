use axum::{
    body::Body,
    extract::{Query, State},
    http::{Response, StatusCode, Uri},
    response::{Html, IntoResponse},
    Extension, Json,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, error, info, Instrument};

use crate::{
    context::RequestContext,
    error::AppError,
    proxy::{self, TransferOutcome},
    server::AppState,
};

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// `GET /api/download-image?url=...`
pub async fn download_image(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response<Body>, AppError> {
    let url = params
        .get("url")
        .filter(|url| !url.is_empty())
        .ok_or(AppError::MissingImageUrl)?;

    let request_id = context
        .map(|Extension(ctx)| ctx.request_id)
        .unwrap_or_default();
    let span = tracing::info_span!("image_transfer", request_id = %request_id, url = %url);

    let (response, transfer) = proxy::download_image(&state.client, url)
        .instrument(span.clone())
        .await?;

    tokio::spawn(
        async move {
            match transfer.completion().await {
                Ok(TransferOutcome::Completed { bytes }) => {
                    info!(bytes, "Image transfer finished")
                }
                Ok(TransferOutcome::Aborted { bytes }) => {
                    debug!(bytes, "Image transfer abandoned by client")
                }
                Err(e) => error!("Error proxying image: {}", e),
            }
        }
        .instrument(span),
    );

    Ok(response)
}

/// `GET /api/shell`: routes, icons and theme for the browser client.
pub async fn shell_manifest(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.shell.as_ref().clone())
}

pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves the shell document for client-side routes with the matched route's
/// title and description already applied.
pub async fn navigate(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let path = uri.path();
    if path.starts_with("/api/") {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response();
    }

    let route = state.shell.routes.resolve(path);
    let status = if route.is_catch_all() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    debug!(path = %path, component = %route.component, "Resolved client route");

    (status, Html(state.document.render(&route.metadata()))).into_response()
}
