use microsearch_core::tokenizer::Tokenizer;
use microsearch_core::{SearchConfig, TokenizationMode};

fn tokenizer(mode: TokenizationMode) -> Tokenizer {
    Tokenizer::new(&SearchConfig { tokenization_mode: mode, ..SearchConfig::default() })
}

#[test]
fn it_normalizes_and_filters_stopwords() {
    let toks = tokenizer(TokenizationMode::Word).tokenize("Hello, World! This is a test.", false);
    assert_eq!(toks, vec!["hello", "world", "test"]);
}

#[test]
fn it_applies_nfkc_before_lowercasing() {
    // full-width letters fold to ASCII
    let toks = tokenizer(TokenizationMode::Word).tokenize("ＲＵＳＴ café", false);
    assert_eq!(toks, vec!["rust", "café"]);
}

#[test]
fn it_keeps_underscores_and_digits_inside_words() {
    let toks = tokenizer(TokenizationMode::Word).tokenize("snake_case v2-beta", false);
    assert_eq!(toks, vec!["snake_case", "v2", "beta"]);
}

#[test]
fn ngram_mode_filters_stopwords_after_windowing() {
    // the leading trigram of "then" is itself a stopword
    let toks = tokenizer(TokenizationMode::Ngram).tokenize("then", false);
    assert_eq!(toks, vec!["hen"]);
}

#[test]
fn query_context_returns_cached_tokens() {
    let t = tokenizer(TokenizationMode::Word);
    assert_eq!(t.tokenize("Search Engines", true), vec!["search", "engines"]);
    assert_eq!(t.tokenize("Search Engines", true), vec!["search", "engines"]);
    assert_eq!(t.query_cache_len(), 1);
    // different raw string, different entry
    t.tokenize("search engines", true);
    assert_eq!(t.query_cache_len(), 2);
}
