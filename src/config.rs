use crate::error::ConfigError;
use dotenv::dotenv;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    pub worker_threads: usize,
    pub upstream_connect_timeout: Duration,
    /// Total budget for an upstream fetch. `None` lets long transfers run to completion.
    pub upstream_timeout: Option<Duration>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` for upstream fetches.
    pub use_system_proxy: bool,
    pub shell_config_path: Option<PathBuf>,
    pub shell_index_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            worker_threads: num_cpus::get(),
            upstream_connect_timeout: Duration::from_secs(10),
            upstream_timeout: None,
            use_system_proxy: true,
            shell_config_path: None,
            shell_index_path: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            worker_threads: parse_var("WORKER_THREADS")?.unwrap_or(defaults.worker_threads),
            upstream_connect_timeout: parse_var("UPSTREAM_CONNECT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_connect_timeout),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")?.map(Duration::from_secs),
            use_system_proxy: parse_flag("UPSTREAM_SYSTEM_PROXY")?.unwrap_or(defaults.use_system_proxy),
            shell_config_path: non_empty_var("SHELL_CONFIG_PATH").map(PathBuf::from),
            shell_index_path: non_empty_var("SHELL_INDEX_PATH").map(PathBuf::from),
            log_format: match non_empty_var("LOG_FORMAT").as_deref() {
                None | Some("compact") => LogFormat::Compact,
                Some("json") => LogFormat::Json,
                Some(other) => {
                    return Err(ConfigError::InvalidVar {
                        name: "LOG_FORMAT",
                        value: other.to_string(),
                    })
                }
            },
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub debug_mode: bool,
    pub prometheus_enabled: bool,
}

impl TelemetryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            debug_mode: parse_flag("TELEMETRY_DEBUG")?.unwrap_or(false),
            prometheus_enabled: parse_flag("ENABLE_PROMETHEUS")?.unwrap_or(false),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
    }
}

fn parse_flag(name: &'static str) -> Result<Option<bool>, ConfigError> {
    match non_empty_var(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidVar { name, value: v }),
        },
    }
}
