//! Resolution of a rule's configured specification documents into bounded
//! excerpts.

use futures::future::join_all;
use semcheck_docs::{DocumentCollection, DocumentError};
use semcheck_llm::LlmProvider;
use semcheck_reduce::{ReduceError, Reducer, RuleContext};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, RuleConfig, SpecConfig};

#[derive(Debug, thiserror::Error)]
pub enum ResolveFailure {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Reduce(#[from] ReduceError),
}

/// A specification that could not be turned into an excerpt for a rule.
#[derive(Debug, thiserror::Error)]
#[error("could not resolve specification {spec_path} for rule {rule}: {reason}")]
pub struct ResolveError {
    pub spec_path: String,
    pub rule: String,
    #[source]
    pub reason: ResolveFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpec {
    pub path: String,
    pub content: String,
    /// Returned whole without a `specifically` hint, yet longer than the
    /// reducer budget.
    pub over_budget: bool,
}

/// Per-spec outcomes of one rule, in configuration order.
#[derive(Debug)]
pub struct RuleResolution {
    pub rule: String,
    pub specs: Vec<Result<ResolvedSpec, ResolveError>>,
}

impl RuleResolution {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.specs.iter().any(Result::is_err)
    }
}

/// Ties one document cache to one reducer. Rules resolved through the same
/// resolver share fetched documents.
pub struct SpecResolver<P> {
    documents: DocumentCollection,
    reducer: Reducer<P>,
}

impl<P: LlmProvider> SpecResolver<P> {
    #[must_use]
    pub fn new(documents: DocumentCollection, reducer: Reducer<P>) -> Self {
        Self { documents, reducer }
    }

    #[must_use]
    pub fn from_config(config: &Config, provider: P) -> Self {
        Self::new(
            DocumentCollection::new(&config.fetch),
            Reducer::new(provider, config.reducer.clone()),
        )
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentCollection {
        &self.documents
    }

    /// Collect `spec.path` (or its anchored section) and, when the spec names
    /// what matters, reduce it to the configured budget.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] wrapping the collection or reduction error.
    pub async fn resolve_spec(
        &self,
        rule: &RuleConfig,
        spec: &SpecConfig,
        cancel: &CancellationToken,
    ) -> Result<ResolvedSpec, ResolveError> {
        let wrap = |reason: ResolveFailure| ResolveError {
            spec_path: spec.path.clone(),
            rule: rule.name.clone(),
            reason,
        };

        let content = self
            .documents
            .get_document(&spec.path, cancel)
            .await
            .map_err(|e| wrap(e.into()))?;

        let (content, over_budget) = match spec.specifically.as_deref() {
            Some(specifically) => {
                let context = RuleContext::new(rule.name.clone(), rule.description.clone());
                let reduced = self
                    .reducer
                    .reduce(&context, &content, specifically, cancel)
                    .await
                    .map_err(|e| wrap(e.into()))?;
                (reduced, false)
            }
            None => {
                let chars = content.chars().count();
                let budget = self.reducer.config().budget;
                if chars > budget {
                    tracing::warn!(
                        rule = %rule.name,
                        spec = %spec.path,
                        chars,
                        budget,
                        "specification has no `specifically` hint and exceeds the budget, returning it whole"
                    );
                }
                (content, chars > budget)
            }
        };

        tracing::debug!(
            rule = %rule.name,
            spec = %spec.path,
            chars = content.chars().count(),
            "resolved specification"
        );
        Ok(ResolvedSpec {
            path: spec.path.clone(),
            content,
            over_budget,
        })
    }

    /// Resolve every spec of `rule` in order. A failing spec does not stop
    /// the others.
    pub async fn resolve_rule(
        &self,
        rule: &RuleConfig,
        cancel: &CancellationToken,
    ) -> RuleResolution {
        let mut specs = Vec::with_capacity(rule.specs.len());
        for spec in &rule.specs {
            let result = self.resolve_spec(rule, spec, cancel).await;
            if let Err(ref e) = result {
                tracing::warn!("{e}");
            }
            specs.push(result);
        }
        RuleResolution {
            rule: rule.name.clone(),
            specs,
        }
    }

    /// Resolve all enabled rules concurrently. Results keep the order of
    /// `rules`.
    pub async fn resolve_all<'a, I>(
        &self,
        rules: I,
        cancel: &CancellationToken,
    ) -> Vec<RuleResolution>
    where
        I: IntoIterator<Item = &'a RuleConfig>,
    {
        let pending: Vec<_> = rules
            .into_iter()
            .filter(|rule| rule.enabled)
            .map(|rule| self.resolve_rule(rule, cancel))
            .collect();
        tracing::debug!(rules = pending.len(), "resolving rules");
        join_all(pending).await
    }
}
