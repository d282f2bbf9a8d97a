use super::{Config, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SEMCHECK_LLM_PROVIDER") {
            match v.parse() {
                Ok(kind) => self.llm.provider = kind,
                Err(_) => tracing::warn!("ignoring invalid SEMCHECK_LLM_PROVIDER value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("SEMCHECK_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("SEMCHECK_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("SEMCHECK_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("SEMCHECK_API_KEY")
            && !v.is_empty()
        {
            self.llm.api_key = Some(Secret::new(v));
        }
        if let Ok(v) = std::env::var("SEMCHECK_FETCH_TIMEOUT") {
            match v.parse::<u64>() {
                Ok(secs) => self.fetch.timeout = secs,
                Err(_) => tracing::warn!("ignoring invalid SEMCHECK_FETCH_TIMEOUT value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("SEMCHECK_REDUCER_STRATEGY") {
            match v.parse() {
                Ok(strategy) => self.reducer.strategy = strategy,
                Err(_) => tracing::warn!("ignoring invalid SEMCHECK_REDUCER_STRATEGY value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("SEMCHECK_REDUCER_BUDGET") {
            match v.parse::<usize>() {
                Ok(budget) => self.reducer.budget = budget,
                Err(_) => tracing::warn!("ignoring invalid SEMCHECK_REDUCER_BUDGET value: {v}"),
            }
        }
    }
}
