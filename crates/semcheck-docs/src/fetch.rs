use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{DocumentError, Result};
use crate::kind::DocumentType;
use crate::source::DocumentSource;

fn default_timeout() -> u64 {
    5
}

fn default_max_body_bytes() -> usize {
    10_485_760
}

fn default_user_agent() -> String {
    concat!("semcheck/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Remote document retrieval settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

/// Raw bytes of a document together with its detected type.
#[derive(Debug)]
pub struct Fetched {
    pub content: Vec<u8>,
    pub kind: DocumentType,
}

/// Reads local files and performs bounded HTTP GETs. Failures are surfaced,
/// never retried.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl Fetcher {
    #[must_use]
    pub fn new(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Retrieve the bytes behind `source` and classify them.
    ///
    /// # Errors
    ///
    /// Returns a type-detection error for local files without a known
    /// extension, [`DocumentError::FetchFailed`] for read, network, timeout or
    /// status failures, [`DocumentError::BodyTooLarge`] for oversized remote
    /// bodies and [`DocumentError::Cancelled`] if `cancel` fires first.
    pub async fn fetch(
        &self,
        source: &DocumentSource,
        cancel: &CancellationToken,
    ) -> Result<Fetched> {
        let fut = async {
            match source {
                DocumentSource::Local { path, .. } => Self::fetch_local(path).await,
                DocumentSource::Remote { url, .. } => {
                    let mut url = url.clone();
                    url.set_fragment(None);
                    self.fetch_remote(&url).await
                }
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(source = %source, "fetch cancelled");
                Err(DocumentError::Cancelled { location: source.to_string() })
            }
            res = fut => res,
        }
    }

    async fn fetch_local(path: &Path) -> Result<Fetched> {
        tracing::debug!(path = %path.display(), "collecting local document");
        let kind = DocumentType::from_extension(path)?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| DocumentError::FetchFailed {
                location: path.display().to_string(),
                status: None,
                reason: e.to_string(),
            })?;
        Ok(Fetched { content, kind })
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Fetched> {
        tracing::debug!(url = %url, "collecting remote document");
        let failed = |status: Option<u16>, reason: String| DocumentError::FetchFailed {
            location: url.to_string(),
            status,
            reason,
        };

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(failed(Some(status.as_u16()), format!("HTTP {status}")));
        }

        if let Some(len) = resp.content_length()
            && usize::try_from(len).map_or(true, |len| len > self.max_body_bytes)
        {
            return Err(DocumentError::BodyTooLarge {
                location: url.to_string(),
                limit: self.max_body_bytes,
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| failed(Some(status.as_u16()), e.to_string()))?;

        if bytes.len() > self.max_body_bytes {
            return Err(DocumentError::BodyTooLarge {
                location: url.to_string(),
                limit: self.max_body_bytes,
            });
        }

        let kind = DocumentType::from_mime(content_type.as_deref(), url.path());
        tracing::debug!(url = %url, kind = %kind, bytes = bytes.len(), "remote document fetched");

        Ok(Fetched {
            content: bytes.to_vec(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default())
    }

    #[test]
    fn default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 5);
        assert_eq!(config.max_body_bytes, 10_485_760);
        assert!(config.user_agent.starts_with("semcheck/"));
    }

    #[tokio::test]
    async fn local_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("spec.md");
        std::fs::write(&file, "# Title\n\nbody").unwrap();

        let source = DocumentSource::parse(file.to_str().unwrap()).unwrap();
        let fetched = fetcher()
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fetched.kind, DocumentType::Markdown);
        assert_eq!(fetched.content, b"# Title\n\nbody");
    }

    #[tokio::test]
    async fn local_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("absent.md");
        let source = DocumentSource::parse(file.to_str().unwrap()).unwrap();
        let err = fetcher()
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::FetchFailed { status: None, .. }));
    }

    #[tokio::test]
    async fn local_without_extension_fails_before_reading() {
        let source = DocumentSource::parse("/definitely/not/here/SPEC").unwrap();
        let err = fetcher()
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::LocalFileNoExtension { .. }));
    }

    #[tokio::test]
    async fn remote_html_by_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rfc9110.html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<h1 id=\"x\">X</h1>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let source =
            DocumentSource::parse(&format!("{}/rfc9110.html#x", server.uri())).unwrap();
        let fetched = fetcher()
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fetched.kind, DocumentType::Html);
    }

    #[tokio::test]
    async fn remote_plain_markdown_is_reclassified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raw/README.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("# Readme", "text/plain; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let source = DocumentSource::parse(&format!("{}/raw/README.md", server.uri())).unwrap();
        let fetched = fetcher()
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fetched.kind, DocumentType::Markdown);
    }

    #[tokio::test]
    async fn remote_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = DocumentSource::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = fetcher()
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::FetchFailed {
                status: Some(404),
                ..
            }
        ));
        assert!(err.to_string().contains("/missing"));
    }

    #[tokio::test]
    async fn remote_body_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let config = FetchConfig {
            max_body_bytes: 16,
            ..FetchConfig::default()
        };
        let source = DocumentSource::parse(&server.uri()).unwrap();
        let err = Fetcher::new(&config)
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::BodyTooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn remote_timeout_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = FetchConfig {
            timeout: 1,
            ..FetchConfig::default()
        };
        let source = DocumentSource::parse(&server.uri()).unwrap();
        let err = Fetcher::new(&config)
            .fetch(&source, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn cancelled_fetch_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let source = DocumentSource::parse(&server.uri()).unwrap();
        let f = fetcher();
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move { f.fetch(&source, &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let err = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, DocumentError::Cancelled { .. }));
    }
}
