//! Specification document collection.
//!
//! A source string (local path or URL, optionally carrying a `#fragment`) is
//! resolved to a [`DocumentSource`], fetched, classified into a
//! [`DocumentType`] and parsed into a [`CollectedDocument`] whose anchors map
//! to section content. [`DocumentCollection`] caches parsed documents by
//! normalized source identity.

pub mod anchor;
pub mod cache;
pub mod document;
pub mod error;
pub mod fetch;
pub mod kind;
pub mod parser;
pub mod source;

pub use anchor::slugify;
pub use cache::{DocumentCollection, collect_document};
pub use document::CollectedDocument;
pub use error::DocumentError;
pub use fetch::{FetchConfig, Fetched, Fetcher};
pub use kind::DocumentType;
pub use parser::{DocumentParser, parse_document};
pub use source::{CacheKey, DocumentSource};
