//! Backend for the AI studio web app.
//!
//! Serves the image download proxy (`/api/download-image`), the client shell
//! manifest (`/api/shell`) and the shell document for client-side routes.

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod proxy;
pub mod server;
pub mod shell;
pub mod telemetry;

pub use crate::{
    config::{AppConfig, LogFormat, TelemetryConfig},
    error::{AppError, ConfigError},
    server::{build_router, serve, AppState},
};
