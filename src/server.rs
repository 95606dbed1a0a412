use axum::{
    http::{header, HeaderName},
    middleware::from_fn,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{future::Future, io, net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    context::request_context_middleware,
    error::ConfigError,
    handlers,
    proxy::{build_client, X_FILE_EXTENSION},
    shell::{ShellConfig, ShellDocument},
    telemetry::{metrics_middleware, MetricsRegistry},
};

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub shell: Arc<ShellConfig>,
    pub document: Arc<ShellDocument>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Builds the upstream client and loads the shell configuration named by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let client = build_client(config)?;
        let shell = ShellConfig::load(config.shell_config_path.as_deref())?;
        let document = ShellDocument::load(config.shell_index_path.as_deref())?;

        Ok(Self {
            client,
            shell: Arc::new(shell),
            document: Arc::new(document),
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

pub fn build_router(state: AppState, metrics_registry: Arc<MetricsRegistry>) -> Router {
    debug!("Setting up CORS layer with 1-hour max age");
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        // Browsers hide these from cross-origin callers unless exposed.
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(X_FILE_EXTENSION),
        ])
        .max_age(Duration::from_secs(3600));

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/download-image", get(handlers::download_image))
        .route("/api/shell", get(handlers::shell_manifest));

    if state.prometheus.is_some() {
        router = router.route("/metrics", get(handlers::prometheus_metrics));
    }

    router
        .fallback(handlers::navigate)
        .layer(from_fn_with_state(metrics_registry, metrics_middleware))
        .layer(from_fn(request_context_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .layer(cors)
}

pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Studio gateway listening on {}", addr);
    }

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
