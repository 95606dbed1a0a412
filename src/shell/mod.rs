//! Client application shell: routes with their document metadata, the icon
//! set and the theme palette. All of it is plain data built once at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

mod document;
mod icons;
mod routes;
mod theme;

pub use document::{DocumentMetadata, ShellDocument};
pub use icons::{IconRegistry, ICON_COMPONENT};
pub use routes::{Route, RouteTable, CATCH_ALL_PATH};
pub use theme::ThemeTokens;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    pub routes: RouteTable,
    #[serde(default)]
    pub icons: IconRegistry,
    #[serde(default)]
    pub theme: ThemeTokens,
}

impl ShellConfig {
    /// Built-in defaults, or the JSON file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            routes = config.routes.routes().count(),
            icons = config.icons.icons().len(),
            "Loaded shell configuration"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}
