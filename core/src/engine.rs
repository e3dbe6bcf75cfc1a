//! The search service: one owned index plus everything needed to turn a
//! query string into ranked, highlighted results.
//!
//! Writers (`index_document`, `add_documents`, `clear_index`) need `&mut self`.
//! `search` only needs `&self`; the caches and the IDF table it touches carry
//! their own locks, so an embedding app can keep the engine behind a single
//! reader/writer lock and run queries concurrently.

use crate::config::SearchConfig;
use crate::document::{DocId, SearchDocument, SearchOptions, SearchResult};
use crate::error::{Result, SearchError};
use crate::index::{FieldSet, InvertedIndex};
use crate::snippet::SnippetGenerator;
use crate::store::DocumentStore;
use crate::tokenizer::Tokenizer;
use std::time::{Duration, Instant};

pub struct SearchEngine {
    config: SearchConfig,
    tokenizer: Tokenizer,
    store: DocumentStore,
    index: InvertedIndex,
    snippets: SnippetGenerator,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(&config),
            store: DocumentStore::new(),
            index: InvertedIndex::new(config.field_weights),
            snippets: SnippetGenerator::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    /// Stores and indexes `doc`, replacing an earlier document with the same id.
    pub fn index_document(&mut self, doc: SearchDocument) -> Result<()> {
        if doc.id.is_empty() {
            return Err(SearchError::EmptyDocumentId);
        }
        self.index.index_document(&doc, &self.tokenizer);
        self.store.put(doc)
    }

    /// Indexes up to `max_docs` documents; anything past that is dropped
    /// with a warning, as is any document without an id. Returns how many
    /// were indexed.
    pub fn add_documents<I>(&mut self, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = SearchDocument>,
    {
        let max_docs = self.config.max_docs;
        let mut over_limit = 0usize;
        let mut indexed = 0usize;
        for (position, doc) in docs.into_iter().enumerate() {
            if doc.id.is_empty() {
                tracing::warn!(position, title = %doc.title, "skipping document without an id");
                continue;
            }
            if indexed >= max_docs {
                over_limit += 1;
                continue;
            }
            self.index_document(doc)?;
            indexed += 1;
        }
        if over_limit > 0 {
            let received = indexed + over_limit;
            tracing::warn!(received, max_docs, "document limit reached, extra documents ignored");
        }
        tracing::info!(indexed, total = self.store.count(), "documents added");
        Ok(indexed)
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let start = Instant::now();
        let tokens = self.tokenizer.tokenize(query, true);
        let fields = FieldSet::from_names(options.fields.as_deref());
        let scores = self.index.search(&tokens, fields, self.config.allow_phrase_search);

        let mut ranked: Vec<_> = scores.into_iter().collect();
        ranked.sort_by(|a, b| a.1.rank_cmp(&b.1));
        let limit = options.limit.unwrap_or(self.config.search_max_results);

        let mut results = Vec::with_capacity(limit.min(ranked.len()));
        for (doc_id, scored) in ranked {
            if results.len() >= limit {
                break;
            }
            let Some(doc) = self.store.get(&doc_id) else { continue };
            results.push(SearchResult {
                doc_id,
                title: doc.title.clone(),
                path: doc.path.clone().unwrap_or_else(|| doc.id.to_string()),
                snippet: self.snippets.generate(&doc.content, &tokens),
                score: scored.score,
            });
        }

        let elapsed = start.elapsed();
        if elapsed > Duration::from_millis(self.config.timeout_warn_ms) {
            let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
            tracing::warn!(query, elapsed_ms, threshold_ms = self.config.timeout_warn_ms, "slow search");
        } else {
            tracing::debug!(query, hits = results.len(), took_s = elapsed.as_secs_f64(), "search");
        }
        results
    }

    pub fn clear_index(&mut self) {
        tracing::debug!(documents = self.store.count(), "clearing index");
        self.index.clear();
        self.store.clear();
        self.tokenizer.clear_cache();
        self.snippets.clear_cache();
    }

    pub fn tokenize(&self, text: &str, is_query: bool) -> Vec<String> {
        self.tokenizer.tokenize(text, is_query)
    }

    pub fn generate_snippet(&self, text: &str, query_tokens: &[String]) -> String {
        self.snippets.generate(text, query_tokens)
    }

    pub fn get_document(&self, id: &DocId) -> Option<&SearchDocument> {
        self.store.get(id)
    }

    pub fn document_count(&self) -> usize { self.store.count() }

    pub fn index(&self) -> &InvertedIndex { &self.index }
}

impl Default for SearchEngine {
    fn default() -> Self { Self::new(SearchConfig::default()) }
}
