pub mod exporters;
pub mod metrics;
pub mod middleware;
pub mod plugins;

pub use self::{
    exporters::prometheus::{install_prometheus_recorder, PrometheusExporter},
    metrics::{MetricsExporter, MetricsRegistry},
    middleware::metrics_middleware,
    plugins::ConsolePlugin,
};

use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RequestMetrics {
    // Request metadata
    pub request_id: String,
    pub method: String,
    pub path: String,
    /// Router pattern that handled the request, `fallback` for client routes.
    pub route: String,
    pub timestamp: DateTime<Utc>,

    // Timing metrics
    pub time_to_headers: Duration,
    pub total_latency: Duration,

    // Size metrics
    pub response_size: usize,

    // Status metrics
    pub status_code: u16,
    pub file_extension: Option<String>,

    // Error metrics
    pub error_type: Option<String>,
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self {
            request_id: String::new(),
            method: String::new(),
            path: String::new(),
            route: String::new(),
            timestamp: Utc::now(),
            time_to_headers: Duration::default(),
            total_latency: Duration::default(),
            response_size: 0,
            status_code: 0,
            file_extension: None,
            error_type: None,
        }
    }
}
