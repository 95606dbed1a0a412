use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::document::DocumentMetadata;
use crate::error::ConfigError;

pub const CATCH_ALL_PATH: &str = "/:pathMatch(.*)*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub component: String,
    #[serde(default)]
    pub name: Option<String>,
    pub title: String,
    pub description: String,
}

impl Route {
    fn new(path: &str, component: &str, title: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            component: component.to_string(),
            name: None,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    pub fn is_catch_all(&self) -> bool {
        self.path.starts_with("/:") && self.path.ends_with("(.*)*")
    }

    /// What the client's navigation hook writes into the document head.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// Page routes of the client application, ending in a single catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Route>", into = "Vec<Route>")]
pub struct RouteTable {
    routes: Vec<Route>,
    catch_all: Route,
}

impl RouteTable {
    pub fn new(mut routes: Vec<Route>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(ConfigError::InvalidRoutes(format!(
                    "path {:?} must start with '/'",
                    route.path
                )));
            }
            if !seen.insert(route.path.as_str()) {
                return Err(ConfigError::InvalidRoutes(format!(
                    "duplicate path {:?}",
                    route.path
                )));
            }
        }

        match routes.iter().filter(|r| r.is_catch_all()).count() {
            1 => {}
            0 => return Err(ConfigError::InvalidRoutes("missing catch-all route".to_string())),
            _ => return Err(ConfigError::InvalidRoutes("more than one catch-all route".to_string())),
        }
        let catch_all = match routes.pop() {
            Some(route) if route.is_catch_all() => route,
            _ => {
                return Err(ConfigError::InvalidRoutes(
                    "catch-all route must be last".to_string(),
                ))
            }
        };

        Ok(Self { routes, catch_all })
    }

    /// Every route in declaration order, catch-all last.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().chain(std::iter::once(&self.catch_all))
    }

    /// Literal match first, ignoring one trailing slash, then the catch-all.
    pub fn resolve(&self, path: &str) -> &Route {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        self.routes
            .iter()
            .find(|route| route.path == path)
            .unwrap_or(&self.catch_all)
    }
}

impl TryFrom<Vec<Route>> for RouteTable {
    type Error = ConfigError;

    fn try_from(routes: Vec<Route>) -> Result<Self, Self::Error> {
        Self::new(routes)
    }
}

impl From<RouteTable> for Vec<Route> {
    fn from(mut table: RouteTable) -> Self {
        table.routes.push(table.catch_all);
        table.routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut not_found = Route::new(
            CATCH_ALL_PATH,
            "NotFoundPage",
            "Page Not Found",
            "The page you are looking for does not exist.",
        );
        not_found.name = Some("NotFoundPage".to_string());

        Self {
            catch_all: not_found,
            routes: vec![
                Route::new(
                    "/",
                    "LandingPage",
                    "AI Studio",
                    "Experiment with chat completion and image generation models.",
                ),
                Route::new(
                    "/chat-completion",
                    "ChatCompletion",
                    "Chat Completion",
                    "Chat with a language model and tune its completion settings.",
                ),
                Route::new(
                    "/image-generation",
                    "GenerateImage",
                    "Image Generation",
                    "Generate images from text prompts and download the results.",
                ),
            ],
        }
    }
}
