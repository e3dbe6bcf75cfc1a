//! Linear TF-IDF scoring over the candidate set of a query.

use crate::document::DocId;
use crate::index::{FieldSet, InvertedIndex};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocScore {
    /// Sum of `tf * idf` over matched query tokens. May be zero or negative
    /// when a token occurs in every document.
    pub score: f64,
    /// Sum of weighted term frequencies over matched query tokens.
    pub matched_weight: f64,
    /// Number of distinct query tokens found in the document.
    pub matched_terms: usize,
    pub(crate) seq: u64,
}

impl DocScore {
    /// Ranking order: higher score first, then more matched weight, then
    /// earlier insertion.
    pub fn rank_cmp(&self, other: &DocScore) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.matched_weight.total_cmp(&self.matched_weight))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Scores `tokens` against `index` using a prepared IDF table.
///
/// A repeated query token counts once per repetition.
pub(crate) fn score(
    index: &InvertedIndex,
    idf: &HashMap<String, f64>,
    tokens: &[String],
    fields: FieldSet,
    phrase: bool,
) -> HashMap<DocId, DocScore> {
    let mut distinct: Vec<(&str, usize)> = Vec::new();
    for t in tokens {
        match distinct.iter_mut().find(|(d, _)| *d == t.as_str()) {
            Some((_, n)) => *n += 1,
            None => distinct.push((t.as_str(), 1)),
        }
    }

    let weights = index.weights();
    let mut scores: HashMap<DocId, DocScore> = HashMap::new();
    for (term, repeats) in &distinct {
        let (Some(plist), Some(&term_idf)) = (index.postings(term), idf.get(*term)) else {
            continue;
        };
        for (doc_id, tf) in plist {
            if !tf.present_in(fields) {
                continue;
            }
            let weighted = tf.weighted(weights, fields) * *repeats as f64;
            let entry = scores.entry(doc_id.clone()).or_insert_with(|| DocScore {
                score: 0.0,
                matched_weight: 0.0,
                matched_terms: 0,
                seq: index.sequence(doc_id),
            });
            entry.score += weighted * term_idf;
            entry.matched_weight += weighted;
            entry.matched_terms += 1;
        }
    }

    if phrase {
        let required = distinct.len();
        scores.retain(|_, s| s.matched_terms == required);
    }
    scores
}

#[cfg(test)]
mod tests {
    use crate::config::SearchConfig;
    use crate::document::{DocId, SearchDocument};
    use crate::index::{FieldSet, InvertedIndex};
    use crate::tokenizer::Tokenizer;

    fn corpus() -> InvertedIndex {
        let cfg = SearchConfig::default();
        let tok = Tokenizer::new(&cfg);
        let mut idx = InvertedIndex::new(cfg.field_weights);
        idx.index_document(&SearchDocument::new(1, "Rust", "rust programming systems language fast"), &tok);
        idx.index_document(&SearchDocument::new(2, "Python", "python programming scripting easy"), &tok);
        idx.index_document(&SearchDocument::new(3, "Java", "java enterprise programming verbose"), &tok);
        idx.index_document(&SearchDocument::new(4, "Memory", "rust memory safety"), &tok);
        idx
    }

    fn q(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn empty_query_scores_nothing() {
        assert!(corpus().search(&[], FieldSet::ALL, false).is_empty());
    }

    #[test]
    fn candidates_are_union_of_token_postings() {
        let scores = corpus().search(&q(&["rust", "python"]), FieldSet::ALL, false);
        let mut ids: Vec<_> = scores.keys().cloned().collect();
        ids.sort();
        assert_eq!(ids, vec![DocId::Int(1), DocId::Int(2), DocId::Int(4)]);
    }

    #[test]
    fn tf_idf_values() {
        let idx = corpus();
        let scores = idx.search(&q(&["rust"]), FieldSet::ALL, false);
        let idf = (4.0f64 / 2.0).ln();
        // doc 1: title 1 * 2 + content 1 * 1
        assert!((scores[&DocId::Int(1)].score - 3.0 * idf).abs() < 1e-12);
        assert!((scores[&DocId::Int(4)].score - 1.0 * idf).abs() < 1e-12);
    }

    #[test]
    fn phrase_mode_requires_every_token() {
        let idx = corpus();
        let any = idx.search(&q(&["rust", "memory"]), FieldSet::ALL, false);
        assert_eq!(any.len(), 2);
        let all = idx.search(&q(&["rust", "memory"]), FieldSet::ALL, true);
        assert_eq!(all.len(), 1);
        assert!(all.contains_key(&DocId::Int(4)));
    }

    #[test]
    fn unknown_token_empties_phrase_results() {
        let idx = corpus();
        assert!(idx.search(&q(&["rust", "haskell"]), FieldSet::ALL, true).is_empty());
        assert_eq!(idx.search(&q(&["rust", "haskell"]), FieldSet::ALL, false).len(), 2);
    }

    #[test]
    fn ubiquitous_term_scores_zero() {
        let idx = corpus();
        let scores = idx.search(&q(&["programming"]), FieldSet::ALL, false);
        assert_eq!(scores.len(), 3);
        // df 3 of 4 docs still has positive idf
        assert!(scores.values().all(|s| s.score > 0.0));

        let cfg = SearchConfig::default();
        let tok = Tokenizer::new(&cfg);
        let mut flat = InvertedIndex::new(cfg.field_weights);
        flat.index_document(&SearchDocument::new(1, "", "common"), &tok);
        flat.index_document(&SearchDocument::new(2, "", "common common"), &tok);
        let scores = flat.search(&q(&["common"]), FieldSet::ALL, false);
        assert!(scores.values().all(|s| s.score == 0.0));
        assert!(scores[&DocId::Int(2)].matched_weight > scores[&DocId::Int(1)].matched_weight);
    }

    #[test]
    fn field_selection_limits_matches() {
        let idx = corpus();
        let title_only = FieldSet { title: true, content: false };
        let scores = idx.search(&q(&["rust"]), title_only, false);
        assert_eq!(scores.len(), 1);
        assert!(scores.contains_key(&DocId::Int(1)));
    }

    #[test]
    fn repeated_query_token_counts_twice() {
        let idx = corpus();
        let once = idx.search(&q(&["rust"]), FieldSet::ALL, false);
        let twice = idx.search(&q(&["rust", "rust"]), FieldSet::ALL, true);
        let id = DocId::Int(4);
        assert!((twice[&id].score - 2.0 * once[&id].score).abs() < 1e-12);
    }

    #[test]
    fn rank_order_breaks_ties() {
        let idx = corpus();
        let scores = idx.search(&q(&["programming"]), FieldSet::ALL, false);
        let mut ranked: Vec<_> = scores.into_iter().collect();
        ranked.sort_by(|a, b| a.1.rank_cmp(&b.1));
        let ids: Vec<_> = ranked.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![DocId::Int(1), DocId::Int(2), DocId::Int(3)]);
    }
}
