use std::fmt;
use std::path::Path;

use crate::error::{DocumentError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Markdown,
    Html,
    Txt,
    Pdf,
    Unknown,
}

impl DocumentType {
    /// Classify a local file by its extension. Local documents are never
    /// sniffed by content.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::LocalFileNoExtension`] if the path has no
    /// extension and [`DocumentError::UnknownDocumentType`] if the extension is
    /// not one of `md`, `html`, `txt`, `pdf`.
    pub fn from_extension(path: &Path) -> Result<Self> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Err(DocumentError::LocalFileNoExtension {
                location: path.display().to_string(),
            });
        };

        match ext.to_ascii_lowercase().as_str() {
            "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            _ => Err(DocumentError::UnknownDocumentType {
                location: path.display().to_string(),
            }),
        }
    }

    /// Classify a remote resource by its `Content-Type` header.
    ///
    /// Hosts serve raw Markdown as `text/plain`, so a plain-text response whose
    /// URL path ends in `.md` is reclassified as Markdown.
    #[must_use]
    pub fn from_mime(content_type: Option<&str>, url_path: &str) -> Self {
        let mime = content_type
            .and_then(|h| h.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();

        tracing::debug!(mime = %mime, "mime type received");

        match mime.as_str() {
            "text/html" => Self::Html,
            "text/plain" if url_path.ends_with(".md") => Self::Markdown,
            "text/plain" => Self::Txt,
            "application/pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Markdown | Self::Html)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Txt => "txt",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
