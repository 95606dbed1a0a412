use std::fmt;

/// File extension suggested to the browser for a downloaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileExtension {
    Jpg,
    Gif,
    Png,
}

impl FileExtension {
    /// Maps an upstream `Content-Type` value to an extension.
    ///
    /// Matching is a case-insensitive substring test, so media type parameters
    /// are tolerated. Anything unrecognised falls back to `png`.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("jpeg") || content_type.contains("jpg") {
            FileExtension::Jpg
        } else if content_type.contains("gif") {
            FileExtension::Gif
        } else {
            FileExtension::Png
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileExtension::Jpg => "jpg",
            FileExtension::Gif => "gif",
            FileExtension::Png => "png",
        }
    }

    pub fn content_disposition(self) -> String {
        format!("attachment; filename=\"image.{}\"", self.as_str())
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
