use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// LLM-proposed grep pattern.
    Regex,
    /// Cosine similarity of line embeddings to the hint.
    #[default]
    Embedding,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Embedding => "embedding",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regex" => Ok(Self::Regex),
            "embedding" => Ok(Self::Embedding),
            other => Err(format!("unknown reducer strategy: {other}")),
        }
    }
}

fn default_budget() -> usize {
    8000
}

fn default_context() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReducerConfig {
    #[serde(default)]
    pub strategy: Strategy,
    /// Maximum excerpt length in characters.
    #[serde(default = "default_budget")]
    pub budget: usize,
    #[serde(default = "default_context")]
    pub context_before: usize,
    #[serde(default = "default_context")]
    pub context_after: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            budget: default_budget(),
            context_before: default_context(),
            context_after: default_context(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ReducerConfig::default();
        assert_eq!(c.strategy, Strategy::Embedding);
        assert_eq!(c.budget, 8000);
        assert_eq!(c.context_before, 2);
        assert_eq!(c.context_after, 2);
    }

    #[test]
    fn strategy_from_str() {
        assert_eq!("regex".parse::<Strategy>().unwrap(), Strategy::Regex);
        assert_eq!(" Embedding ".parse::<Strategy>().unwrap(), Strategy::Embedding);
        assert!("bm25".parse::<Strategy>().is_err());
    }

    #[test]
    fn strategy_display() {
        assert_eq!(Strategy::Regex.to_string(), "regex");
        assert_eq!(Strategy::Embedding.to_string(), "embedding");
    }
}
