use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};
use futures_util::StreamExt;
use tracing::{debug, error, info};

use crate::error::AppError;

mod client;
mod extension;
mod transfer;

pub use client::build_client;
pub use extension::FileExtension;
pub use transfer::{Transfer, TransferOutcome};

pub const X_FILE_EXTENSION: &str = "x-file-extension";

/// Fetches `url` and turns the upstream response into a downloadable attachment.
///
/// The returned [`Transfer`] tracks the body relay that is already running;
/// await [`Transfer::completion`] to observe its end or its first error.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Response<Body>, Transfer), AppError> {
    info!(url = %url, "Fetching image from upstream");

    let upstream = client.get(url).send().await.map_err(|e| {
        error!(url = %url, "Error proxying image: {}", e);
        AppError::Upstream(e)
    })?;

    debug!(url = %url, status = %upstream.status(), "Upstream responded");

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .ok_or_else(|| {
            error!(url = %url, "Upstream response has no Content-Type header");
            AppError::MissingContentType
        })?;

    let extension = content_type
        .to_str()
        .map(FileExtension::from_content_type)
        .map_err(|_| {
            error!(url = %url, "Upstream Content-Type is not visible ASCII");
            AppError::InvalidHeader
        })?;

    let disposition = HeaderValue::from_str(&extension.content_disposition())
        .map_err(|_| AppError::InvalidHeader)?;

    let mut upstream_body = upstream.bytes_stream();

    // A failure on the first chunk can still be reported as a clean 500.
    let first = match upstream_body.next().await {
        Some(Ok(chunk)) => Some(chunk),
        Some(Err(e)) => {
            error!(url = %url, "Error proxying image: {}", e);
            return Err(AppError::Stream(e.to_string()));
        }
        None => None,
    };

    let (body, transfer) = Transfer::start(first, upstream_body);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(X_FILE_EXTENSION, HeaderValue::from_static(extension.as_str()))
        .body(body)
        .map_err(|_| AppError::InvalidHeader)?;

    info!(url = %url, extension = %extension, "Streaming image to client");
    Ok((response, transfer))
}
