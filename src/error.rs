use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::{io, path::PathBuf};

pub const MISSING_URL_MESSAGE: &str = "Image URL is required";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Error downloading image";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Image URL is required")]
    MissingImageUrl,

    #[error("Request to upstream failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream body stream failed: {0}")]
    Stream(String),

    #[error("Upstream response has no Content-Type header")]
    MissingContentType,

    #[error("Invalid header value")]
    InvalidHeader,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingImageUrl => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Stream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingContentType | AppError::InvalidHeader => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Upstream detail stays in the logs.
        let message = match &self {
            AppError::MissingImageUrl => MISSING_URL_MESSAGE,
            _ => DOWNLOAD_FAILED_MESSAGE,
        };

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

/// Failures while assembling configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse shell config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid route table: {0}")]
    InvalidRoutes(String),

    #[error("Invalid theme color {name}: {value:?}")]
    InvalidColor { name: String, value: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to install Prometheus recorder: {0}")]
    Prometheus(String),
}
