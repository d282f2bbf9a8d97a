use semcheck_llm::LlmProvider;
use tokio_util::sync::CancellationToken;

use crate::config::{ReducerConfig, Strategy};
use crate::error::ReduceError;
use crate::grep::execute_grep;
use crate::prompt::{GrepQuery, grep_messages};
use crate::similarity::{cosine_similarity, rank, select_ranked};
use crate::window::{char_len, char_prefix, split_lines};

/// Rule metadata passed to query generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleContext {
    pub name: String,
    pub description: String,
}

impl RuleContext {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Everything one reduction needs. Built fresh per call.
#[derive(Debug, Clone, Copy)]
pub struct ReductionRequest<'a> {
    pub content: &'a str,
    pub specifically: &'a str,
    pub rule: &'a RuleContext,
    pub budget: usize,
    pub context_before: usize,
    pub context_after: usize,
}

impl ReductionRequest<'_> {
    #[must_use]
    pub fn within_budget(&self) -> bool {
        char_len(self.content) <= self.budget
    }
}

/// Bounds document text to the configured budget using the configured
/// [`Strategy`].
#[derive(Debug, Clone)]
pub struct Reducer<P> {
    provider: P,
    config: ReducerConfig,
}

impl<P: LlmProvider> Reducer<P> {
    #[must_use]
    pub fn new(provider: P, config: ReducerConfig) -> Self {
        Self { provider, config }
    }

    #[must_use]
    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn request<'a>(
        &self,
        rule: &'a RuleContext,
        content: &'a str,
        specifically: &'a str,
    ) -> ReductionRequest<'a> {
        ReductionRequest {
            content,
            specifically,
            rule,
            budget: self.config.budget,
            context_before: self.config.context_before,
            context_after: self.config.context_after,
        }
    }

    /// Reduce `content` to the budget, keeping what is relevant to
    /// `specifically`. Content already within budget is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the strategy's [`ReduceError`], or [`ReduceError::Cancelled`].
    pub async fn reduce(
        &self,
        rule: &RuleContext,
        content: &str,
        specifically: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ReduceError> {
        let request = self.request(rule, content, specifically);
        self.reduce_with(self.config.strategy, &request, cancel)
            .await
    }

    /// Like [`Reducer::reduce`] with an explicit strategy and request.
    ///
    /// # Errors
    ///
    /// Returns the strategy's [`ReduceError`], or [`ReduceError::Cancelled`].
    pub async fn reduce_with(
        &self,
        strategy: Strategy,
        request: &ReductionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ReduceError> {
        if request.within_budget() {
            tracing::debug!(
                rule = %request.rule.name,
                budget = request.budget,
                "content within budget, no reduction"
            );
            return Ok(request.content.to_string());
        }

        tracing::debug!(
            rule = %request.rule.name,
            strategy = %strategy,
            specifically = request.specifically,
            "reducing content"
        );

        match strategy {
            Strategy::Regex => self.reduce_regex(request, cancel).await,
            Strategy::Embedding => self.reduce_embedding(request, cancel).await,
        }
    }

    async fn reduce_regex(
        &self,
        request: &ReductionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ReduceError> {
        let header = char_prefix(request.content, request.budget);
        let messages = grep_messages(
            header,
            request.specifically,
            &request.rule.name,
            &request.rule.description,
        );

        let query: GrepQuery = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ReduceError::Cancelled { strategy: Strategy::Regex });
            }
            res = self.provider.chat_typed::<GrepQuery>(&messages) => {
                res.map_err(ReduceError::QueryGenerationFailed)?
            }
        };
        tracing::debug!(query = %query.query, "generated grep query");

        execute_grep(
            request.content,
            &query.query,
            request.context_before,
            request.context_after,
        )
    }

    async fn reduce_embedding(
        &self,
        request: &ReductionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ReduceError> {
        let query = self.embed(request.specifically, None, cancel).await?;

        let lines = split_lines(request.content);
        let mut scores = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let vector = self.embed(line, Some(i), cancel).await?;
            scores.push((i, cosine_similarity(&query, &vector)));
        }

        let ranked = rank(&scores);
        let reduced = select_ranked(
            &lines,
            &ranked,
            request.budget,
            request.context_before,
            request.context_after,
        );
        tracing::debug!(
            embedded = scores.len(),
            kept_chars = char_len(&reduced),
            "embedding reduction"
        );
        Ok(reduced)
    }

    async fn embed(
        &self,
        text: &str,
        line: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<f32>, ReduceError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ReduceError::Cancelled { strategy: Strategy::Embedding }),
            res = self.provider.embed(text) => res.map_err(|source| ReduceError::EmbeddingFailed {
                target: line.map_or_else(|| "hint".to_string(), |i| format!("line {}", i + 1)),
                source,
            }),
        }
    }
}
