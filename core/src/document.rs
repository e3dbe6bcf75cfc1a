use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a document. Inputs may key documents by number or by string
/// (e.g. a relative file path); both forms are kept distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Int(i64),
    Str(String),
}

impl DocId {
    pub fn is_empty(&self) -> bool {
        matches!(self, DocId::Str(s) if s.is_empty())
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Int(n) => write!(f, "{n}"),
            DocId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocId {
    fn from(n: i64) -> Self { DocId::Int(n) }
}

impl From<i32> for DocId {
    fn from(n: i32) -> Self { DocId::Int(n.into()) }
}

impl From<u32> for DocId {
    fn from(n: u32) -> Self { DocId::Int(n.into()) }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self { DocId::Str(s.to_string()) }
}

impl From<String> for DocId {
    fn from(s: String) -> Self { DocId::Str(s) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: DocId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Any extra fields (frontmatter and the like) ride along untouched.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SearchDocument {
    pub fn new(id: impl Into<DocId>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            path: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub title: String,
    /// `path` of the document, or its stringified id when it has none.
    pub path: String,
    pub snippet: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub limit: Option<usize>,
    /// Restricts scoring to the named fields (`title`, `content`).
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl SearchOptions {
    pub fn limit(limit: usize) -> Self {
        Self { limit: Some(limit), fields: None }
    }
}
