use crate::cache::ClearingCache;
use crate::config::SearchConfig;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};

const PATTERN_CACHE_CAPACITY: usize = 100;

lazy_static! {
    static ref WORD_SPAN: Regex = Regex::new(r"\S+").expect("valid regex");
}

/// Cuts a window of words around the first query match and marks every
/// match inside it as `**match**`.
pub struct SnippetGenerator {
    length: usize,
    context_words: usize,
    patterns: Mutex<ClearingCache<Vec<String>, Regex>>,
}

impl SnippetGenerator {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            length: config.snippet_length,
            context_words: config.snippet_context_words,
            patterns: Mutex::new(ClearingCache::new(PATTERN_CACHE_CAPACITY)),
        }
    }

    pub fn generate(&self, text: &str, query_tokens: &[String]) -> String {
        let Some(pattern) = self.pattern(query_tokens) else {
            return self.prefix(text);
        };
        let Some(first) = pattern.find(text) else {
            return self.prefix(text);
        };

        let words: Vec<(usize, usize)> = WORD_SPAN.find_iter(text).map(|m| (m.start(), m.end())).collect();
        if words.is_empty() {
            return self.prefix(text);
        }
        let hit = words
            .iter()
            .position(|&(_, end)| end > first.start())
            .unwrap_or(words.len() - 1);

        let start = hit.saturating_sub(self.context_words);
        let end = (hit + self.context_words + 1).min(words.len());
        let window = words[start..end]
            .iter()
            .map(|&(s, e)| &text[s..e])
            .collect::<Vec<_>>()
            .join(" ");

        let mut snippet = pattern.replace_all(&window, "**$0**").into_owned();
        if start > 0 {
            snippet.insert_str(0, "...");
        }
        if end < words.len() {
            snippet.push_str("...");
        }
        snippet
    }

    pub fn cached_patterns(&self) -> usize { self.patterns.lock().len() }

    pub fn clear_cache(&self) { self.patterns.lock().clear(); }

    fn prefix(&self, text: &str) -> String {
        text.chars().take(self.length).collect()
    }

    /// Case-insensitive alternation of the tokens, longest first so an
    /// overlapping shorter token cannot shadow a longer one.
    fn pattern(&self, tokens: &[String]) -> Option<Regex> {
        let mut key: Vec<String> = tokens.iter().filter(|t| !t.is_empty()).cloned().collect();
        if key.is_empty() {
            return None;
        }
        key.sort_unstable();
        key.dedup();
        if let Some(re) = self.patterns.lock().get(&key) {
            return Some(re);
        }

        let mut terms: Vec<&str> = key.iter().map(String::as_str).collect();
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        let re = match RegexBuilder::new(&alternation).case_insensitive(true).build() {
            Ok(re) => re,
            Err(err) => {
                tracing::warn!(%err, "could not build snippet pattern");
                return None;
            }
        };
        self.patterns.lock().insert(key, re.clone());
        Some(re)
    }
}
