//! Content reduction: bound a document to a character budget while keeping
//! the passages relevant to a natural-language hint.

pub mod config;
pub mod error;
pub mod grep;
pub mod prompt;
pub mod reducer;
pub mod similarity;
mod window;

pub use config::{ReducerConfig, Strategy};
pub use error::ReduceError;
pub use reducer::{Reducer, ReductionRequest, RuleContext};
