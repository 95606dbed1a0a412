use crate::{
    error::ConfigError,
    telemetry::{
        metrics::{ExportError, MetricsExporter},
        RequestMetrics,
    },
};
use async_trait::async_trait;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the process-wide Prometheus recorder, once.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, ConfigError> {
    HANDLE
        .get_or_try_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| ConfigError::Prometheus(e.to_string()))
        })
        .cloned()
}

pub struct PrometheusExporter {
    namespace: String,
}

impl PrometheusExporter {
    pub fn new(namespace: String) -> Self {
        Self { namespace }
    }
}

#[async_trait]
impl MetricsExporter for PrometheusExporter {
    async fn export_metrics(&self, metrics: RequestMetrics) -> Result<(), ExportError> {
        let labels = [
            ("method", metrics.method.clone()),
            ("route", metrics.route.clone()),
            ("status", metrics.status_code.to_string()),
        ];

        let name = format!("{}_requests_total", self.namespace);
        counter!(name, &labels).increment(1);

        // Record latency metrics
        let name = format!("{}_time_to_headers_seconds", self.namespace);
        histogram!(name, &labels).record(metrics.time_to_headers.as_secs_f64());

        let name = format!("{}_request_duration_seconds", self.namespace);
        histogram!(name, &labels).record(metrics.total_latency.as_secs_f64());

        // Record size metrics
        let name = format!("{}_response_bytes_total", self.namespace);
        counter!(name, &labels).increment(metrics.response_size as u64);

        if let Some(extension) = metrics.file_extension {
            let name = format!("{}_image_downloads_total", self.namespace);
            counter!(name, "extension" => extension).increment(1);
        }

        // Record error metrics
        if metrics.error_type.is_some() {
            let name = format!("{}_stream_errors_total", self.namespace);
            counter!(name, &labels).increment(1);
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "prometheus"
    }
}
