use super::metrics::MetricsRegistry;
use super::RequestMetrics;
use crate::{context::RequestContext, proxy::X_FILE_EXTENSION};
use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{MatchedPath, State},
    http::{Request, Response},
    middleware::Next,
};
use chrono::Utc;
use futures_util::StreamExt;
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Records one [`RequestMetrics`] per request once its response body ends.
///
/// Bodies with a known length pass through untouched. Streamed bodies are
/// forwarded chunk by chunk, never buffered, so image downloads keep streaming
/// while their size is counted.
pub async fn metrics_middleware(
    State(registry): State<Arc<MetricsRegistry>>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let timestamp = Utc::now();

    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "fallback".to_string());
    let request_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    debug!("Received request: path={}, method={}", path, method);

    let response = next.run(req).await;
    let time_to_headers = start.elapsed();

    let file_extension = response
        .headers()
        .get(X_FILE_EXTENSION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let status_code = response.status().as_u16();

    if let Some(len) = response.body().size_hint().exact() {
        let metrics = RequestMetrics {
            request_id,
            method,
            path,
            route,
            timestamp,
            time_to_headers,
            total_latency: start.elapsed(),
            response_size: len as usize,
            status_code,
            file_extension,
            error_type: None,
        };
        tokio::spawn(async move {
            debug!("Recording request metrics: {:?}", metrics);
            registry.record_metrics(metrics).await;
        });
        return response;
    }

    let (parts, body) = response.into_parts();
    let (tx, rx) = mpsc::channel::<Result<Bytes, axum::Error>>(16);

    tokio::spawn(async move {
        let mut response_size = 0;
        let mut error_type = None;

        let mut stream = body.into_data_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    let len = bytes.len();
                    if tx.send(Ok(bytes)).await.is_err() {
                        error_type = Some("client disconnected".to_string());
                        break;
                    }
                    response_size += len;
                }
                Err(e) => {
                    error_type = Some(e.to_string());
                    let _ = tx.send(Err(e)).await;
                    break;
                }
            }
        }
        drop(tx);

        let metrics = RequestMetrics {
            request_id,
            method,
            path,
            route,
            timestamp,
            time_to_headers,
            total_latency: start.elapsed(),
            response_size,
            status_code,
            file_extension,
            error_type,
        };

        debug!("Recording request metrics: {:?}", metrics);
        registry.record_metrics(metrics).await;
    });

    Response::from_parts(parts, Body::from_stream(ReceiverStream::new(rx)))
}
