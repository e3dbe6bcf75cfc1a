use criterion::{criterion_group, criterion_main, Criterion};
use microsearch_core::tokenizer::Tokenizer;
use microsearch_core::{SearchConfig, TokenizationMode};

const TEXT: &str = "Inverted indexes map every term to the documents containing it. \
    Ranking weighs how often a term occurs in a document against how many documents \
    contain it at all, so rare terms count for more than common ones.";

fn bench_tokenize(c: &mut Criterion) {
    let text = TEXT.repeat(50);
    for mode in [TokenizationMode::Word, TokenizationMode::Ngram, TokenizationMode::Whitespace] {
        let tok = Tokenizer::new(&SearchConfig { tokenization_mode: mode, ..SearchConfig::default() });
        c.bench_function(&format!("tokenize_{mode}"), |b| b.iter(|| tok.tokenize(&text, false)));
    }
    let tok = Tokenizer::new(&SearchConfig::default());
    c.bench_function("tokenize_cached_query", |b| b.iter(|| tok.tokenize("ranking rare terms", true)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
