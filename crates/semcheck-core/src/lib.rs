//! Configuration, provider construction and per-rule specification
//! resolution for semcheck.

pub mod config;
pub mod provider;
pub mod resolver;

pub use config::{Config, LlmConfig, ProviderKind, RuleConfig, Secret, SpecConfig};
pub use provider::create_provider;
pub use resolver::{ResolveError, ResolveFailure, ResolvedSpec, RuleResolution, SpecResolver};
