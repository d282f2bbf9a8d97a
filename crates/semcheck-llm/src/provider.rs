use std::future::Future;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and return the assistant response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response is invalid.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Send messages and deserialize the assistant response into `T`.
    ///
    /// Providers with native structured output override this; the default asks
    /// for plain chat output and extracts the JSON object from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not match `T`.
    fn chat_typed<T>(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<T, LlmError>> + Send
    where
        T: DeserializeOwned + JsonSchema + Send + 'static,
    {
        async move {
            let raw = self.chat(messages).await?;
            parse_structured(&raw)
        }
    }

    /// Compute an embedding vector for a single piece of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no embedding model or the request fails.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn supports_embeddings(&self) -> bool;

    fn name(&self) -> &str;
}

/// Parse a JSON object out of a chat response.
///
/// Models frequently wrap JSON in a fenced code block or surround it with prose,
/// so the outermost `{ ... }` span is used when the whole text is not valid JSON.
///
/// # Errors
///
/// Returns [`LlmError::StructuredParse`] if no JSON object matching `T` is found.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
        return Err(LlmError::StructuredParse(format!(
            "no JSON object in response: {}",
            truncate(trimmed, 200)
        )));
    };
    if end < start {
        return Err(LlmError::StructuredParse(format!(
            "malformed JSON object in response: {}",
            truncate(trimmed, 200)
        )));
    }

    serde_json::from_str(&trimmed[start..=end])
        .map_err(|e| LlmError::StructuredParse(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// JSON schema of `T` as a `serde_json::Value`, for providers with native structured output.
///
/// # Errors
///
/// Returns an error if the generated schema cannot be serialized.
pub fn schema_value<T: JsonSchema>() -> Result<serde_json::Value, LlmError> {
    let schema = schemars::schema_for!(T);
    Ok(serde_json::to_value(schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Query {
        query: String,
    }

    #[test]
    fn parse_plain_json() {
        let q: Query = parse_structured(r#"{"query": "status code"}"#).unwrap();
        assert_eq!(q.query, "status code");
    }

    #[test]
    fn parse_fenced_json() {
        let raw = "```json\n{\"query\": \"^15\\\\.3\"}\n```";
        let q: Query = parse_structured(raw).unwrap();
        assert_eq!(q.query, "^15\\.3");
    }

    #[test]
    fn parse_json_with_prose() {
        let raw = "Here is the query you asked for: {\"query\": \"2\\\\d\\\\d\"} hope it helps";
        let q: Query = parse_structured(raw).unwrap();
        assert_eq!(q.query, "2\\d\\d");
    }

    #[test]
    fn parse_without_object_fails() {
        let err = parse_structured::<Query>("no json here").unwrap_err();
        assert!(matches!(err, LlmError::StructuredParse(_)));
    }

    #[test]
    fn parse_wrong_shape_fails() {
        let err = parse_structured::<Query>(r#"{"pattern": "x"}"#).unwrap_err();
        assert!(matches!(err, LlmError::StructuredParse(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn schema_has_query_property() {
        let schema = schema_value::<Query>().unwrap();
        let props = schema["properties"].as_object().unwrap();
        assert!(props.contains_key("query"));
    }

    #[test]
    fn message_constructors() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
