use crate::{config::AppConfig, error::ConfigError};
use std::time::Duration;

/// Upstream HTTP client shared by every proxy call.
///
/// Pooling settings favour many short-lived image fetches against a handful of
/// hosts. The total request timeout is only applied when configured so large
/// transfers are not cut mid-stream.
pub fn build_client(config: &AppConfig) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(32)
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(config.upstream_connect_timeout);

    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    if let Some(timeout) = config.upstream_timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(ConfigError::Client)
}
