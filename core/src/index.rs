//! Term → document postings with document frequencies and a lazily
//! rebuilt IDF table.

use crate::config::FieldWeights;
use crate::document::{DocId, SearchDocument};
use crate::scorer::{self, DocScore};
use crate::tokenizer::Tokenizer;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;

/// Raw occurrence counts of one term in one document, per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermFrequency {
    pub title: u32,
    pub content: u32,
}

impl TermFrequency {
    /// Weighted frequency restricted to `fields`.
    pub fn weighted(&self, weights: &FieldWeights, fields: FieldSet) -> f64 {
        let mut tf = 0.0;
        if fields.title {
            tf += self.title as f64 * weights.title;
        }
        if fields.content {
            tf += self.content as f64 * weights.content;
        }
        tf
    }

    pub fn present_in(&self, fields: FieldSet) -> bool {
        (fields.title && self.title > 0) || (fields.content && self.content > 0)
    }
}

/// Which document fields take part in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    pub title: bool,
    pub content: bool,
}

impl FieldSet {
    pub const ALL: FieldSet = FieldSet { title: true, content: true };

    /// Unknown names are ignored; a selection with no known field means all.
    pub fn from_names(names: Option<&[String]>) -> Self {
        let Some(names) = names else { return Self::ALL };
        let mut set = FieldSet { title: false, content: false };
        for name in names {
            match name.trim().to_ascii_lowercase().as_str() {
                "title" => set.title = true,
                "content" => set.content = true,
                other => tracing::debug!(field = other, "ignoring unknown search field"),
            }
        }
        if set.title || set.content { set } else { Self::ALL }
    }
}

impl Default for FieldSet {
    fn default() -> Self { Self::ALL }
}

#[derive(Debug)]
struct DocEntry {
    /// Insertion sequence, kept across re-indexing.
    seq: u64,
    terms: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct IdfTable {
    pub(crate) values: HashMap<String, f64>,
    dirty: bool,
}

#[derive(Debug, Default)]
pub struct InvertedIndex {
    weights: FieldWeights,
    postings: HashMap<String, HashMap<DocId, TermFrequency>>,
    df: HashMap<String, u32>,
    docs: HashMap<DocId, DocEntry>,
    next_seq: u64,
    idf: RwLock<IdfTable>,
}

impl InvertedIndex {
    pub fn new(weights: FieldWeights) -> Self {
        Self { weights, ..Self::default() }
    }

    pub fn weights(&self) -> &FieldWeights { &self.weights }

    /// Adds `doc`, replacing whatever an earlier call with the same id
    /// contributed.
    pub fn index_document(&mut self, doc: &SearchDocument, tokenizer: &Tokenizer) {
        let mut counts: HashMap<String, TermFrequency> = HashMap::new();
        for token in tokenizer.tokenize(&doc.title, false) {
            counts.entry(token).or_default().title += 1;
        }
        for token in tokenizer.tokenize(&doc.content, false) {
            counts.entry(token).or_default().content += 1;
        }

        let seq = match self.remove_contribution(&doc.id) {
            Some(seq) => seq,
            None => {
                self.next_seq += 1;
                self.next_seq
            }
        };

        let mut terms = Vec::with_capacity(counts.len());
        for (term, tf) in counts {
            *self.df.entry(term.clone()).or_insert(0) += 1;
            self.postings.entry(term.clone()).or_default().insert(doc.id.clone(), tf);
            terms.push(term);
        }
        self.docs.insert(doc.id.clone(), DocEntry { seq, terms });
        self.idf.get_mut().dirty = true;
    }

    /// Drops the postings and document-frequency counts of a previously
    /// indexed document, returning its sequence number.
    fn remove_contribution(&mut self, id: &DocId) -> Option<u64> {
        let entry = self.docs.remove(id)?;
        for term in entry.terms {
            if let Some(df) = self.df.get_mut(&term) {
                *df -= 1;
                if *df == 0 {
                    self.df.remove(&term);
                }
            }
            if let Some(plist) = self.postings.get_mut(&term) {
                plist.remove(id);
                if plist.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
        Some(entry.seq)
    }

    /// Scores every document containing at least one query token.
    ///
    /// With `phrase` set only documents holding all tokens survive.
    pub fn search(&self, tokens: &[String], fields: FieldSet, phrase: bool) -> HashMap<DocId, DocScore> {
        if tokens.is_empty() || self.docs.is_empty() {
            return HashMap::new();
        }
        let idf = self.idf_table();
        scorer::score(self, &idf.values, tokens, fields, phrase)
    }

    /// Read access to the IDF table, rebuilding it first if writes landed
    /// since the last rebuild. Only the rebuild takes the write lock.
    fn idf_table(&self) -> RwLockReadGuard<'_, IdfTable> {
        {
            let table = self.idf.read();
            if !table.dirty {
                return table;
            }
        }
        let mut table = self.idf.write();
        if table.dirty {
            let n = self.docs.len() as f64;
            table.values = self
                .df
                .iter()
                .map(|(term, &df)| (term.clone(), (n / df as f64).ln()))
                .collect();
            table.dirty = false;
            tracing::debug!(terms = table.values.len(), "rebuilt idf table");
        }
        RwLockWriteGuard::downgrade(table)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        if self.docs.is_empty() {
            return None;
        }
        self.idf_table().values.get(term).copied()
    }

    pub(crate) fn postings(&self, term: &str) -> Option<&HashMap<DocId, TermFrequency>> {
        self.postings.get(term)
    }

    pub(crate) fn sequence(&self, id: &DocId) -> u64 {
        self.docs.get(id).map(|e| e.seq).unwrap_or(u64::MAX)
    }

    pub fn term_frequency(&self, term: &str, id: &DocId) -> Option<TermFrequency> {
        self.postings.get(term)?.get(id).copied()
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }

    pub fn total_documents(&self) -> usize { self.docs.len() }

    pub fn term_count(&self) -> usize { self.df.len() }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.df.clear();
        self.docs.clear();
        self.next_seq = 0;
        *self.idf.get_mut() = IdfTable::default();
    }
}
