use serde::{Deserialize, Serialize};

pub const ICON_COMPONENT: &str = "font-awesome-icon";

const DEFAULT_ICONS: [&str; 5] = [
    "columns",
    "edit",
    "exclamation-circle",
    "exclamation",
    "download",
];

/// Solid icons made available to the client under a single component tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IconRegistryFile")]
pub struct IconRegistry {
    component: String,
    icons: Vec<String>,
}

#[derive(Deserialize)]
struct IconRegistryFile {
    #[serde(default = "default_component")]
    component: String,
    icons: Vec<String>,
}

fn default_component() -> String {
    ICON_COMPONENT.to_string()
}

impl From<IconRegistryFile> for IconRegistry {
    fn from(file: IconRegistryFile) -> Self {
        let mut registry = IconRegistry::new(file.component);
        for icon in file.icons {
            registry.register(icon);
        }
        registry
    }
}

impl IconRegistry {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            icons: Vec::new(),
        }
    }

    /// Returns false when the icon was already registered.
    pub fn register(&mut self, icon: impl Into<String>) -> bool {
        let icon = icon.into();
        if self.contains(&icon) {
            return false;
        }
        self.icons.push(icon);
        true
    }

    pub fn contains(&self, icon: &str) -> bool {
        self.icons.iter().any(|registered| registered == icon)
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn icons(&self) -> &[String] {
        &self.icons
    }
}

impl Default for IconRegistry {
    fn default() -> Self {
        let mut registry = IconRegistry::new(ICON_COMPONENT);
        for icon in DEFAULT_ICONS {
            registry.register(icon);
        }
        registry
    }
}
