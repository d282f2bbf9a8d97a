use std::fmt;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{DocumentError, Result};

/// Where a specification document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Local {
        path: PathBuf,
        fragment: Option<String>,
    },
    Remote {
        url: Url,
        /// Percent-decoded, so it matches the raw text of a local fragment.
        fragment: Option<String>,
    },
}

/// Normalized identity of a source, fragment discarded.
///
/// Remote keys drop the scheme so `http://` and `https://` spellings of the
/// same resource share one entry; local keys keep the literal path, so
/// `./spec.md` and `../spec.md` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    Local(String),
    Remote(String),
}

impl CacheKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local(s) | Self::Remote(s) => s,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(s) => write!(f, "local:{s}"),
            Self::Remote(s) => write!(f, "remote:{s}"),
        }
    }
}

impl DocumentSource {
    /// Parse a source string: a local path (optionally `#fragment`), a
    /// `file://` URL, or a remote URL.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::BadSource`] if the string is empty or is
    /// neither a path nor a well-formed URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DocumentError::BadSource {
                location: raw.to_string(),
                reason: "empty source".into(),
            });
        }

        match Url::parse(trimmed) {
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .unwrap_or_else(|()| PathBuf::from(url.path()));
                Ok(Self::Local {
                    path,
                    fragment: decoded_fragment(&url),
                })
            }
            Ok(url) => {
                if !url.has_host() {
                    return Err(DocumentError::BadSource {
                        location: raw.to_string(),
                        reason: format!("{} URL has no host", url.scheme()),
                    });
                }
                let fragment = decoded_fragment(&url);
                Ok(Self::Remote { url, fragment })
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let (path, fragment) = match trimmed.split_once('#') {
                    Some((path, fragment)) => (path, non_empty(Some(fragment))),
                    None => (trimmed, None),
                };
                if path.is_empty() {
                    return Err(DocumentError::BadSource {
                        location: raw.to_string(),
                        reason: "fragment without a path".into(),
                    });
                }
                Ok(Self::Local {
                    path: PathBuf::from(path),
                    fragment,
                })
            }
            Err(e) => Err(DocumentError::BadSource {
                location: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Local { fragment, .. } | Self::Remote { fragment, .. } => fragment.as_deref(),
        }
    }

    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::Local { path, .. } => Some(path),
            Self::Remote { .. } => None,
        }
    }

    /// The URL to request, without its fragment.
    #[must_use]
    pub fn fetch_url(&self) -> Option<Url> {
        match self {
            Self::Local { .. } => None,
            Self::Remote { url, .. } => {
                let mut url = url.clone();
                url.set_fragment(None);
                Some(url)
            }
        }
    }

    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        match self {
            Self::Local { path, .. } => CacheKey::Local(path.to_string_lossy().into_owned()),
            Self::Remote { url, .. } => {
                let mut key = url.host_str().unwrap_or_default().to_string();
                if let Some(port) = url.port() {
                    key.push(':');
                    key.push_str(&port.to_string());
                }
                let path = url.path();
                key.push_str(if path.is_empty() { "/" } else { path });
                if let Some(query) = url.query() {
                    key.push('?');
                    key.push_str(query);
                }
                CacheKey::Remote(key)
            }
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { path, fragment } => {
                write!(f, "{}", path.display())?;
                if let Some(fragment) = fragment {
                    write!(f, "#{fragment}")?;
                }
                Ok(())
            }
            Self::Remote { url, .. } => write!(f, "{url}"),
        }
    }
}

fn non_empty(fragment: Option<&str>) -> Option<String> {
    fragment.filter(|f| !f.is_empty()).map(str::to_string)
}

fn decoded_fragment(url: &Url) -> Option<String> {
    url.fragment()
        .filter(|f| !f.is_empty())
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> CacheKey {
        DocumentSource::parse(raw).unwrap().cache_key()
    }

    #[test]
    fn remote_keys_normalize() {
        let expected = CacheKey::Remote("a.com/".into());
        assert_eq!(key("https://a.com"), expected);
        assert_eq!(key("https://a.com/"), expected);
        assert_eq!(key("http://a.com/#frag"), expected);
    }

    #[test]
    fn remote_key_keeps_port_path_and_query() {
        assert_eq!(
            key("http://localhost:8080/rfc/9110.html?v=2#status"),
            CacheKey::Remote("localhost:8080/rfc/9110.html?v=2".into())
        );
    }

    #[test]
    fn local_keys_are_literal() {
        assert_eq!(key("./spec.md"), CacheKey::Local("./spec.md".into()));
        assert_eq!(key("../spec.md"), CacheKey::Local("../spec.md".into()));
        assert_ne!(key("./spec.md"), key("../spec.md"));
        assert_eq!(key("./spec.md#intro"), key("./spec.md"));
    }

    #[test]
    fn local_and_remote_never_collide() {
        assert_ne!(key("a.com/"), key("https://a.com/"));
    }

    #[test]
    fn local_fragment_split() {
        let src = DocumentSource::parse("docs/spec.md#Section One").unwrap();
        assert_eq!(src.local_path(), Some(Path::new("docs/spec.md")));
        assert_eq!(src.fragment(), Some("Section One"));
        assert!(!src.is_remote());
    }

    #[test]
    fn empty_fragment_is_none() {
        assert_eq!(DocumentSource::parse("spec.md#").unwrap().fragment(), None);
        assert_eq!(
            DocumentSource::parse("https://a.com/x#").unwrap().fragment(),
            None
        );
    }

    #[test]
    fn file_scheme_is_local() {
        let src = DocumentSource::parse("file:///tmp/spec.md#intro").unwrap();
        assert_eq!(src.local_path(), Some(Path::new("/tmp/spec.md")));
        assert_eq!(src.fragment(), Some("intro"));
    }

    #[test]
    fn remote_fetch_url_drops_fragment() {
        let src = DocumentSource::parse("https://www.rfc-editor.org/rfc/rfc9110.html#status.codes")
            .unwrap();
        assert!(src.is_remote());
        assert_eq!(src.fragment(), Some("status.codes"));
        assert_eq!(
            src.fetch_url().unwrap().as_str(),
            "https://www.rfc-editor.org/rfc/rfc9110.html"
        );
    }

    #[test]
    fn bad_sources() {
        for raw in ["", "   ", "#only-fragment", "http://[::1", "mailto:someone@example.com"] {
            assert!(
                matches!(
                    DocumentSource::parse(raw),
                    Err(DocumentError::BadSource { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn url_fragments_are_percent_decoded() {
        let remote = DocumentSource::parse("https://a.com/README.md#Getting Started").unwrap();
        let local = DocumentSource::parse("README.md#Getting Started").unwrap();
        assert_eq!(remote.fragment(), Some("Getting Started"));
        assert_eq!(remote.fragment(), local.fragment());

        let encoded = DocumentSource::parse("https://a.com/x.md#caf%C3%A9%20menu").unwrap();
        assert_eq!(encoded.fragment(), Some("café menu"));

        let file = DocumentSource::parse("file:///tmp/spec.md#Section%20One").unwrap();
        assert_eq!(file.fragment(), Some("Section One"));
    }

    #[test]
    fn display_round_trips_fragment() {
        let src = DocumentSource::parse("spec.md#a").unwrap();
        assert_eq!(src.to_string(), "spec.md#a");
    }
}
