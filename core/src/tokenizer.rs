use crate::cache::FifoCache;
use crate::config::{SearchConfig, TokenizationMode};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"\W+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","from","had","has","have","he","how",
            "in","is","it","its","of","on","over","that","the","they","this","to","was","were","what",
            "when","where","which","who","why","will","with",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token) || STOPWORDS.contains(token.to_lowercase().as_str())
}

/// Splits text into terms according to the configured mode.
///
/// Query tokenization goes through a bounded cache keyed on the raw query;
/// document text never touches it.
pub struct Tokenizer {
    mode: TokenizationMode,
    remove_stopwords: bool,
    stemming: bool,
    ngram_size: usize,
    query_cache: Mutex<FifoCache<String, Vec<String>>>,
}

impl Tokenizer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            mode: config.tokenization_mode,
            remove_stopwords: config.remove_stopwords,
            stemming: config.stemming,
            ngram_size: config.ngram_size.max(1),
            query_cache: Mutex::new(FifoCache::new(config.query_cache_capacity)),
        }
    }

    pub fn mode(&self) -> TokenizationMode { self.mode }

    pub fn tokenize(&self, text: &str, is_query: bool) -> Vec<String> {
        if !is_query {
            return self.split(text);
        }
        if let Some(hit) = self.query_cache.lock().get(&text.to_string()) {
            return hit;
        }
        let tokens = self.split(text);
        self.query_cache.lock().insert(text.to_string(), tokens.clone());
        tokens
    }

    pub fn query_cache_len(&self) -> usize { self.query_cache.lock().len() }

    pub fn clear_cache(&self) { self.query_cache.lock().clear(); }

    fn split(&self, text: &str) -> Vec<String> {
        let mut tokens = match self.mode {
            TokenizationMode::Word => words(text),
            TokenizationMode::Ngram => ngrams(text, self.ngram_size),
            TokenizationMode::Whitespace => text.split_whitespace().map(str::to_string).collect(),
        };
        if self.remove_stopwords {
            tokens.retain(|t| !is_stopword(t));
        }
        if self.stemming && self.mode == TokenizationMode::Word {
            for t in tokens.iter_mut() {
                *t = STEMMER.stem(t).into_owned();
            }
        }
        tokens
    }
}

fn words(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    NON_WORD
        .split(&normalized)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Words shorter than `n` pass through whole; longer ones become every
/// contiguous window of `n` characters.
fn ngrams(text: &str, n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for word in words(text) {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < n {
            out.push(word);
            continue;
        }
        for window in chars.windows(n) {
            out.push(window.iter().collect());
        }
    }
    out
}
