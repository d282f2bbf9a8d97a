use std::time::Duration;

use anyhow::Context;
use semcheck_llm::AnyProvider;
use semcheck_llm::http::default_client;
use semcheck_llm::ollama::OllamaProvider;
use semcheck_llm::openai::OpenAiProvider;

use crate::config::{LlmConfig, ProviderKind};

/// Build the provider selected by `[llm]`.
///
/// # Errors
///
/// Returns an error when the `openai` provider has no API key.
pub fn create_provider(config: &LlmConfig) -> anyhow::Result<AnyProvider> {
    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        embedding_model = %config.embedding_model,
        "creating LLM provider"
    );

    match config.provider {
        ProviderKind::OpenAi => {
            let api_key = config
                .api_key
                .as_ref()
                .context("SEMCHECK_API_KEY must be set for the openai provider")?;
            let provider = OpenAiProvider::new(
                api_key.expose().to_owned(),
                config.base_url.clone(),
                config.model.clone(),
                config.max_tokens,
                Some(config.embedding_model.clone()),
            )
            .with_client(default_client(Duration::from_secs(config.timeout)));
            Ok(AnyProvider::OpenAi(provider))
        }
        ProviderKind::Ollama => Ok(AnyProvider::Ollama(OllamaProvider::new(
            &config.base_url,
            config.model.clone(),
            config.embedding_model.clone(),
        ))),
    }
}
