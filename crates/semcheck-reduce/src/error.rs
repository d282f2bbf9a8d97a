use semcheck_llm::LlmError;

use crate::config::Strategy;

#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    #[error("grep query {pattern:?} does not compile: {reason}")]
    RegexCompileFailed { pattern: String, reason: String },

    #[error("grep query {pattern:?} matched no lines")]
    NoRegexMatches { pattern: String },

    #[error("embedding {target} failed: {source}")]
    EmbeddingFailed {
        target: String,
        #[source]
        source: LlmError,
    },

    #[error("grep query generation failed: {0}")]
    QueryGenerationFailed(#[source] LlmError),

    #[error("{strategy} reduction cancelled")]
    Cancelled { strategy: Strategy },
}
