//! In-process full-text search: TF-IDF ranked keyword queries with
//! highlighted snippets over a set of short text documents.
//!
//! ```
//! use microsearch_core::{SearchConfig, SearchDocument, SearchEngine, SearchOptions};
//!
//! let mut engine = SearchEngine::new(SearchConfig::default());
//! engine.index_document(SearchDocument::new(1, "Rust", "Rust is a systems language.")).unwrap();
//! let hits = engine.search("systems", &SearchOptions::default());
//! assert_eq!(hits.len(), 1);
//! assert!(hits[0].snippet.contains("**systems**"));
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod scorer;
pub mod snippet;
pub mod store;
pub mod tokenizer;

pub use config::{FieldWeights, SearchConfig, TokenizationMode};
pub use document::{DocId, SearchDocument, SearchOptions, SearchResult};
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
