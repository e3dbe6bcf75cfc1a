use crate::document::{DocId, SearchDocument};
use crate::error::{Result, SearchError};
use std::collections::HashMap;

/// Original documents by id, used to materialize results.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: HashMap<DocId, SearchDocument>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    /// Inserts `doc`, replacing any document with the same id.
    pub fn put(&mut self, doc: SearchDocument) -> Result<()> {
        if doc.id.is_empty() {
            return Err(SearchError::EmptyDocumentId);
        }
        self.docs.insert(doc.id.clone(), doc);
        Ok(())
    }

    pub fn get(&self, id: &DocId) -> Option<&SearchDocument> {
        self.docs.get(id)
    }

    pub fn contains(&self, id: &DocId) -> bool {
        self.docs.contains_key(id)
    }

    pub fn count(&self) -> usize { self.docs.len() }

    pub fn clear(&mut self) { self.docs.clear(); }
}
