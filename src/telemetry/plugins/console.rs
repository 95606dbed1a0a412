use crate::telemetry::{
    metrics::{ExportError, MetricsExporter},
    RequestMetrics,
};
use async_trait::async_trait;
use colored::Colorize;

pub struct ConsolePlugin;

impl ConsolePlugin {
    pub fn new() -> Self {
        ConsolePlugin
    }
}

impl Default for ConsolePlugin {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn summary_line(metrics: &RequestMetrics) -> String {
    let status = metrics.status_code.to_string();
    let status = match metrics.status_code {
        200..=299 => status.green(),
        400..=499 => status.yellow(),
        _ => status.red(),
    };

    let mut line = format!(
        "{} {} {} {} bytes in {:?}",
        metrics.method.bold(),
        metrics.path,
        status,
        metrics.response_size,
        metrics.total_latency
    );
    if let Some(extension) = &metrics.file_extension {
        line.push_str(&format!(" [{}]", extension));
    }
    if let Some(error) = &metrics.error_type {
        line.push_str(&format!(" {}", error.red()));
    }
    line
}

#[async_trait]
impl MetricsExporter for ConsolePlugin {
    async fn export_metrics(&self, metrics: RequestMetrics) -> Result<(), ExportError> {
        println!("{}", summary_line(&metrics));
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
