use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::document::CollectedDocument;
use crate::error::{DocumentError, Result};
use crate::fetch::{FetchConfig, Fetcher};
use crate::parser::parse_document;
use crate::source::{CacheKey, DocumentSource};

type Slot = Arc<OnceCell<Arc<CollectedDocument>>>;

/// Fetch, classify and parse `source` without caching.
async fn load(
    fetcher: &Fetcher,
    source: &DocumentSource,
    cancel: &CancellationToken,
) -> Result<CollectedDocument> {
    let fetched = fetcher.fetch(source, cancel).await?;
    parse_document(fetched.kind, fetched.content, &source.to_string())
}

/// Resolve a source string into a parsed document plus its fragment, if any.
///
/// # Errors
///
/// Returns [`DocumentError::BadSource`] for unparsable sources and any fetch
/// or parse error.
pub async fn collect_document(
    fetcher: &Fetcher,
    raw: &str,
    cancel: &CancellationToken,
) -> Result<(CollectedDocument, Option<String>)> {
    let source = DocumentSource::parse(raw)?;
    let doc = load(fetcher, &source, cancel).await?;
    Ok((doc, source.fragment().map(str::to_string)))
}

/// Memoizes parsed documents by normalized source identity.
///
/// Concurrent requests for one key share a single fetch and parse: the first
/// caller initialises the slot, the others await it. A failed load leaves the
/// slot empty so a later call tries again.
#[derive(Debug)]
pub struct DocumentCollection {
    fetcher: Fetcher,
    documents: Mutex<HashMap<CacheKey, Slot>>,
}

impl DocumentCollection {
    #[must_use]
    pub fn new(config: &FetchConfig) -> Self {
        Self::with_fetcher(Fetcher::new(config))
    }

    #[must_use]
    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            documents: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(documents.entry(key.clone()).or_default())
    }

    /// The cached document for `source`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns any fetch or parse error, or [`DocumentError::Cancelled`].
    pub async fn collect(
        &self,
        source: &DocumentSource,
        cancel: &CancellationToken,
    ) -> Result<Arc<CollectedDocument>> {
        let key = source.cache_key();
        let slot = self.slot(&key);

        if let Some(doc) = slot.get() {
            tracing::debug!(key = %key, "document cache hit");
            return Ok(Arc::clone(doc));
        }

        let init = slot.get_or_try_init(|| async {
            tracing::debug!(key = %key, "document cache miss");
            load(&self.fetcher, source, cancel).await.map(Arc::new)
        });

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(DocumentError::Cancelled { location: source.to_string() }),
            res = init => res.map(Arc::clone),
        }
    }

    /// Full text of the document named by `raw`, or the anchored section when
    /// `raw` carries a `#fragment`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::BadSource`] for unparsable sources,
    /// [`DocumentError::AnchorNotSupportedOnUnstructuredDocument`] for a
    /// fragment on a plain-text document, and any fetch or parse error.
    pub async fn get_document(&self, raw: &str, cancel: &CancellationToken) -> Result<String> {
        let source = DocumentSource::parse(raw)?;
        let doc = self.collect(&source, cancel).await?;

        match source.fragment() {
            Some(anchor) => doc.anchored_section(anchor).map(str::to_string),
            None => Ok(doc.text().into_owned()),
        }
    }

    /// Number of documents currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
