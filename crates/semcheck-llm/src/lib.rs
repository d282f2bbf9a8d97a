//! LLM provider abstraction used by the semcheck reducer.
//!
//! Only the typed results of a provider are consumed downstream: a chat
//! completion (optionally parsed into a JSON-schema described type) and an
//! embedding vector.

pub mod any;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;

pub use any::AnyProvider;
pub use error::LlmError;
pub use provider::{LlmProvider, Message, Role};
