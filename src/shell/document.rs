use serde::Serialize;
use std::{borrow::Cow, path::Path};

use crate::error::ConfigError;

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>AI Studio</title>
  </head>
  <body>
    <div id="app"></div>
    <script type="module" src="/src/main.js"></script>
  </body>
</html>
"#;

/// Title and meta description applied to the document on navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub description: String,
}

impl DocumentMetadata {
    /// Rewrites `<title>` and `<meta name="description">` in `html`, inserting
    /// them into `<head>` when they are missing.
    pub fn apply(&self, html: &str) -> String {
        let title = format!("<title>{}</title>", escape_html(&self.title));
        let meta = format!(
            r#"<meta name="description" content="{}" />"#,
            escape_html(&self.description)
        );

        let html = replace_or_insert(html, find_title(html), &title);
        replace_or_insert(&html, find_description_meta(&html), &meta)
    }
}

/// HTML shell served for client-side routes.
#[derive(Debug, Clone)]
pub struct ShellDocument {
    template: Cow<'static, str>,
}

impl Default for ShellDocument {
    fn default() -> Self {
        Self {
            template: Cow::Borrowed(DEFAULT_INDEX),
        }
    }
}

impl ShellDocument {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            None => Ok(Self::default()),
            Some(path) => std::fs::read_to_string(path)
                .map(|template| Self {
                    template: Cow::Owned(template),
                })
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }),
        }
    }

    pub fn render(&self, metadata: &DocumentMetadata) -> String {
        metadata.apply(&self.template)
    }
}

fn replace_or_insert(html: &str, existing: Option<(usize, usize)>, tag: &str) -> String {
    if let Some((start, end)) = existing {
        return format!("{}{}{}", &html[..start], tag, &html[end..]);
    }
    match html.to_ascii_lowercase().find("</head>") {
        Some(at) => format!("{}  {}\n  {}", &html[..at], tag, &html[at..]),
        None => format!("{}\n{}", tag, html),
    }
}

/// Byte range of the whole `<title>...</title>` element.
fn find_title(html: &str) -> Option<(usize, usize)> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<title")?;
    let close = lower[start..].find("</title>")? + start;
    Some((start, close + "</title>".len()))
}

/// Byte range of the first `<meta ...>` tag whose name is `description`.
fn find_description_meta(html: &str) -> Option<(usize, usize)> {
    let lower = html.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(found) = lower[offset..].find("<meta") {
        let start = offset + found;
        let end = start + lower[start..].find('>')? + 1;
        let tag = &lower[start..end];
        if tag.contains(r#"name="description""#) || tag.contains("name='description'") {
            return Some((start, end));
        }
        offset = end;
    }
    None
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
