use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Color palette and content globs handed to the client's styling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThemeFile")]
pub struct ThemeTokens {
    content: Vec<String>,
    colors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ThemeFile {
    #[serde(default)]
    content: Vec<String>,
    colors: BTreeMap<String, String>,
}

impl TryFrom<ThemeFile> for ThemeTokens {
    type Error = ConfigError;

    fn try_from(file: ThemeFile) -> Result<Self, Self::Error> {
        ThemeTokens::new(file.content, file.colors)
    }
}

impl ThemeTokens {
    pub fn new(
        content: Vec<String>,
        colors: BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        if let Some((name, value)) = colors.iter().find(|(_, value)| !is_hex_color(value)) {
            return Err(ConfigError::InvalidColor {
                name: name.clone(),
                value: value.clone(),
            });
        }
        Ok(Self { content, colors })
    }

    pub fn color(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    pub fn colors(&self) -> &BTreeMap<String, String> {
        &self.colors
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }
}

impl Default for ThemeTokens {
    fn default() -> Self {
        let colors = [
            ("primary", "#1a1a1a"),
            ("secondary", "#3E4C59"),
            ("spanColor", "#52606D"),
            ("tinWhite", "#FFFFFFDE"),
            ("hover_color", "#242526"),
            ("hover_color2", "#3a3b3c"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

        Self {
            content: vec![
                "./index.html".to_string(),
                "./src/**/*.{vue,js,ts,jsx,tsx}".to_string(),
            ],
            colors,
        }
    }
}

/// `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
