use std::borrow::Cow;
use std::collections::HashMap;

use crate::anchor::slugify;
use crate::error::{DocumentError, Result};
use crate::kind::DocumentType;

/// A fetched and parsed document. Immutable once built.
#[derive(Debug, Clone)]
pub struct CollectedDocument {
    kind: DocumentType,
    content: Vec<u8>,
    anchors: HashMap<String, String>,
}

impl CollectedDocument {
    #[must_use]
    pub fn unstructured(content: Vec<u8>) -> Self {
        Self {
            kind: DocumentType::Txt,
            content,
            anchors: HashMap::new(),
        }
    }

    #[must_use]
    pub fn structured(
        kind: DocumentType,
        content: Vec<u8>,
        anchors: HashMap<String, String>,
    ) -> Self {
        Self {
            kind,
            content,
            anchors,
        }
    }

    #[must_use]
    pub fn kind(&self) -> DocumentType {
        self.kind
    }

    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.kind.is_structured()
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The raw content as text, invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    #[must_use]
    pub fn anchors(&self) -> &HashMap<String, String> {
        &self.anchors
    }

    #[must_use]
    pub fn anchor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.anchors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Content of the section named `name`.
    ///
    /// The name is looked up verbatim first and then in slugified form. An
    /// unknown anchor yields an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::AnchorNotSupportedOnUnstructuredDocument`] for
    /// unstructured documents, whatever the name.
    pub fn anchored_section(&self, name: &str) -> Result<&str> {
        if !self.is_structured() {
            return Err(DocumentError::AnchorNotSupportedOnUnstructuredDocument {
                anchor: name.to_string(),
            });
        }

        if let Some(section) = self.anchors.get(name) {
            return Ok(section);
        }

        Ok(self
            .anchors
            .get(&slugify(name))
            .map_or("", String::as_str))
    }
}
