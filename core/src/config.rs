//! Engine configuration.
//!
//! Every option has a default; [`SearchConfig::from_env`] overlays whatever
//! the process environment provides. Bad values are logged and ignored so a
//! typo in the environment never keeps the engine from starting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizationMode {
    #[default]
    Word,
    Ngram,
    Whitespace,
}

impl FromStr for TokenizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(TokenizationMode::Word),
            "ngram" => Ok(TokenizationMode::Ngram),
            "whitespace" => Ok(TokenizationMode::Whitespace),
            other => Err(format!("unknown tokenization mode {other:?}")),
        }
    }
}

impl fmt::Display for TokenizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenizationMode::Word => "word",
            TokenizationMode::Ngram => "ngram",
            TokenizationMode::Whitespace => "whitespace",
        };
        f.write_str(name)
    }
}

/// Multipliers applied to term occurrences per field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub title: f64,
    pub content: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self { title: 2.0, content: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on documents accepted by one bulk load.
    pub max_docs: usize,
    pub search_max_results: usize,
    /// Searches slower than this are logged; they are never cut short.
    pub timeout_warn_ms: u64,
    /// Require every query token to be present in a matching document.
    pub allow_phrase_search: bool,
    pub tokenization_mode: TokenizationMode,
    pub remove_stopwords: bool,
    pub field_weights: FieldWeights,
    pub snippet_length: usize,
    pub snippet_context_words: usize,
    pub ngram_size: usize,
    pub query_cache_capacity: usize,
    pub stemming: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_docs: 100_000,
            search_max_results: 10,
            timeout_warn_ms: 100,
            allow_phrase_search: false,
            tokenization_mode: TokenizationMode::Word,
            remove_stopwords: true,
            field_weights: FieldWeights::default(),
            snippet_length: 150,
            snippet_context_words: 10,
            ngram_size: 3,
            query_cache_capacity: 1000,
            stemming: false,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        overlay(&lookup, "MAX_DOCS", &mut cfg.max_docs, parse_from_str);
        overlay(&lookup, "SEARCH_MAX_RESULTS", &mut cfg.search_max_results, parse_from_str);
        overlay(&lookup, "TIMEOUT_WARN_MS", &mut cfg.timeout_warn_ms, parse_from_str);
        overlay(&lookup, "ALLOW_PHRASE_SEARCH", &mut cfg.allow_phrase_search, parse_bool);
        overlay(&lookup, "TOKENIZATION_MODE", &mut cfg.tokenization_mode, parse_from_str);
        overlay(&lookup, "REMOVE_STOPWORDS", &mut cfg.remove_stopwords, parse_bool);
        overlay(&lookup, "FIELD_WEIGHTS", &mut cfg.field_weights, parse_field_weights);
        overlay(&lookup, "SNIPPET_LENGTH", &mut cfg.snippet_length, parse_from_str);
        overlay(&lookup, "SNIPPET_CONTEXT_WORDS", &mut cfg.snippet_context_words, parse_from_str);
        overlay(&lookup, "NGRAM_SIZE", &mut cfg.ngram_size, parse_from_str);
        overlay(&lookup, "QUERY_CACHE_SIZE", &mut cfg.query_cache_capacity, parse_from_str);
        overlay(&lookup, "STEMMING", &mut cfg.stemming, parse_bool);
        if cfg.ngram_size == 0 {
            tracing::warn!("NGRAM_SIZE must be positive, using default");
            cfg.ngram_size = Self::default().ngram_size;
        }
        cfg
    }
}

fn overlay<T, F, P>(lookup: &F, key: &str, slot: &mut T, parse: P)
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else { return };
    match parse(raw.trim()) {
        Some(v) => *slot = v,
        None => tracing::warn!(key, value = %raw, "ignoring unparsable config value"),
    }
}

fn parse_from_str<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

/// Boolean flag parsing shared by every env switch: `true/1/yes/on` and
/// `false/0/no/off` (empty counts as false), case-insensitive.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Accepts `{"title": 3, "content": 1}`; a missing key keeps its default.
fn parse_field_weights(raw: &str) -> Option<FieldWeights> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let obj = value.as_object()?;
    let mut weights = FieldWeights::default();
    if let Some(v) = obj.get("title") {
        weights.title = v.as_f64()?;
    }
    if let Some(v) = obj.get("content") {
        weights.content = v.as_f64()?;
    }
    Some(weights)
}
