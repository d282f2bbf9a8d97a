//! Parser dispatch by document type.

mod html;
mod markdown;

use crate::document::CollectedDocument;
use crate::error::{DocumentError, Result};
use crate::kind::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentParser {
    Markdown,
    Html,
    Unstructured,
}

impl DocumentParser {
    /// Select the parser for a detected type. Plain text and unrecognised
    /// remote content fall back to an unstructured document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NoDocumentParser`] for PDF documents.
    pub fn for_type(kind: DocumentType, location: &str) -> Result<Self> {
        match kind {
            DocumentType::Markdown => Ok(Self::Markdown),
            DocumentType::Html => Ok(Self::Html),
            DocumentType::Txt | DocumentType::Unknown => Ok(Self::Unstructured),
            DocumentType::Pdf => Err(DocumentError::NoDocumentParser {
                location: location.to_string(),
                kind: kind.to_string(),
            }),
        }
    }

    /// Build a [`CollectedDocument`] from raw bytes. The bytes are kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ParseFailed`] if a structured document is not
    /// valid UTF-8.
    pub fn parse(self, content: Vec<u8>, location: &str) -> Result<CollectedDocument> {
        let (kind, anchors) = match self {
            Self::Unstructured => return Ok(CollectedDocument::unstructured(content)),
            Self::Markdown => {
                let anchors = markdown::parse_anchors(utf8(&content, location)?);
                (DocumentType::Markdown, anchors)
            }
            Self::Html => {
                let anchors = html::parse_anchors(utf8(&content, location)?);
                (DocumentType::Html, anchors)
            }
        };
        Ok(CollectedDocument::structured(kind, content, anchors))
    }
}

fn utf8<'a>(content: &'a [u8], location: &str) -> Result<&'a str> {
    std::str::from_utf8(content).map_err(|e| DocumentError::ParseFailed {
        location: location.to_string(),
        reason: format!("content is not valid UTF-8: {e}"),
    })
}

/// Detect-and-parse in one step.
///
/// # Errors
///
/// See [`DocumentParser::for_type`] and [`DocumentParser::parse`].
pub fn parse_document(
    kind: DocumentType,
    content: Vec<u8>,
    location: &str,
) -> Result<CollectedDocument> {
    DocumentParser::for_type(kind, location)?.parse(content, location)
}
