use anyhow::{Context, Result};
use lazy_static::lazy_static;
use microsearch_core::{SearchDocument, SearchEngine};
use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"(?m)^\s*(```|~~~).*$").expect("valid regex");
    static ref HEADING: Regex = Regex::new(r"(?m)^\s{0,3}#{1,6}\s+").expect("valid regex");
    static ref QUOTE: Regex = Regex::new(r"(?m)^\s*>\s?").expect("valid regex");
    static ref RULE: Regex = Regex::new(r"(?m)^\s*([-*_]\s*){3,}$").expect("valid regex");
    static ref BULLET: Regex = Regex::new(r"(?m)^\s*([-*+]|\d+[.)])\s+").expect("valid regex");
    static ref IMAGE: Regex = Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("valid regex");
    static ref LINK: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex");
    static ref CODE: Regex = Regex::new(r"`([^`]*)`").expect("valid regex");
    static ref STARS: Regex = Regex::new(r"\*{1,3}([^*\n]+?)\*{1,3}").expect("valid regex");
    static ref UNDERSCORES: Regex = Regex::new(r"\b_{1,2}([^_\n]+?)_{1,2}\b").expect("valid regex");
    static ref HTML: Regex = Regex::new(r"<[^>\n]+>").expect("valid regex");
    static ref BLANK_RUN: Regex = Regex::new(r"\n{3,}").expect("valid regex");
}

/// Frontmatter keys that map onto document fields rather than metadata.
const RESERVED_KEYS: &[&str] = &["id", "title", "content", "path"];

/// Loads every `*.md` file under `root` (hidden entries skipped), ordered by
/// relative path. Ids and paths are the `/`-separated relative paths.
pub fn load_documents(root: &Path) -> Result<Vec<SearchDocument>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("document folder {} not found", root.display()))?;
    tracing::info!(root = %root.display(), "loading documents");

    let mut docs = Vec::new();
    let walker = WalkDir::new(&root).into_iter().filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }
        let relative = path
            .strip_prefix(&root)?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("untitled");
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        docs.push(parse_markdown(&relative, stem, &raw));
    }
    docs.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(count = docs.len(), "found markdown files");
    Ok(docs)
}

/// Loads `root` and bulk-indexes it, returning the number indexed.
pub fn add_documents_from_path(engine: &mut SearchEngine, root: &Path) -> Result<usize> {
    let docs = load_documents(root)?;
    Ok(engine.add_documents(docs)?)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

pub fn parse_markdown(relative_path: &str, stem: &str, raw: &str) -> SearchDocument {
    let (mut front, body) = split_frontmatter(raw);
    let title = match front.remove("title") {
        Some(Value::String(t)) => t,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let title = if title.trim().is_empty() { stem.to_string() } else { title };
    front.retain(|k, _| !RESERVED_KEYS.contains(&k.as_str()));

    let mut doc = SearchDocument::new(relative_path.to_string(), title, markdown_to_text(body))
        .with_path(relative_path);
    doc.metadata = front;
    doc
}

/// Splits a leading `---` fenced YAML block off `raw` and parses it into a
/// JSON object. An unclosed fence means there is no frontmatter; a block
/// that is not a YAML mapping is logged and yields no metadata.
pub fn split_frontmatter(raw: &str) -> (Map<String, Value>, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(rest) = text.strip_prefix("---").filter(|r| r.starts_with('\n') || r.starts_with("\r\n")) else {
        return (Map::new(), text);
    };

    let mut offset = 0;
    let mut closed = None;
    for line in rest.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line_start > 0 && line.trim() == "---" {
            closed = Some((line_start, offset));
            break;
        }
    }
    let Some((block_end, body_start)) = closed else {
        return (Map::new(), text);
    };

    let block = &rest[..block_end];
    let front = if block.trim().is_empty() {
        Map::new()
    } else {
        match serde_yaml::from_str::<Option<Map<String, Value>>>(block) {
            Ok(map) => map.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable frontmatter");
                Map::new()
            }
        }
    };
    (front, &rest[body_start..])
}

/// Plain-text rendering of markdown good enough for indexing: markup
/// characters go, the words they decorate stay.
pub fn markdown_to_text(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n");
    let text = FENCE.replace_all(&text, "");
    let text = RULE.replace_all(&text, "");
    let text = HEADING.replace_all(&text, "");
    let text = QUOTE.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = CODE.replace_all(&text, "$1");
    let text = STARS.replace_all(&text, "$1");
    let text = UNDERSCORES.replace_all(&text, "$1");
    let text = HTML.replace_all(&text, "");
    BLANK_RUN.replace_all(&text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frontmatter_is_split_and_typed() {
        let raw = "---\ntitle: Hello\ndraft: false\nweight: 3\ntags: [a, b]\nauthor: \"Ann: Lee\"\n---\n\nBody text";
        let (front, body) = split_frontmatter(raw);
        assert_eq!(front["title"], json!("Hello"));
        assert_eq!(front["draft"], json!(false));
        assert_eq!(front["weight"], json!(3));
        assert_eq!(front["tags"], json!(["a", "b"]));
        assert_eq!(front["author"], json!("Ann: Lee"));
        assert_eq!(body.trim(), "Body text");
    }

    #[test]
    fn block_lists_and_nested_maps_are_kept() {
        let raw = "---\ntitle: Nested\ntags:\n  - rust\n  - search\nauthor:\n  name: Kim\n  site: example.org\n---\nbody";
        let (front, body) = split_frontmatter(raw);
        assert_eq!(front["tags"], json!(["rust", "search"]));
        assert_eq!(front["author"], json!({ "name": "Kim", "site": "example.org" }));
        assert_eq!(body, "body");
    }

    #[test]
    fn empty_or_invalid_frontmatter_yields_no_metadata() {
        let (front, body) = split_frontmatter("---\n---\nbody");
        assert!(front.is_empty());
        assert_eq!(body, "body");

        let (front, body) = split_frontmatter("---\n- just\n- a list\n---\nbody");
        assert!(front.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn missing_or_unclosed_frontmatter_leaves_text_alone() {
        let (front, body) = split_frontmatter("# Just markdown");
        assert!(front.is_empty());
        assert_eq!(body, "# Just markdown");

        let raw = "---\ntitle: never closed\nbody";
        let (front, body) = split_frontmatter(raw);
        assert!(front.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn markdown_markup_is_stripped() {
        let md = "# Title\n\nSome **bold** and _italic_ with `code` and a [link](http://x).\n\n- item one\n> quoted\n\n```rust\nlet x = 1;\n```\n<br/>snake_case stays";
        let text = markdown_to_text(md);
        assert!(text.starts_with("Title"));
        assert!(text.contains("Some bold and italic with code and a link."));
        assert!(text.contains("item one"));
        assert!(text.contains("quoted"));
        assert!(text.contains("let x = 1;"));
        assert!(text.contains("snake_case stays"));
        assert!(!text.contains('#'));
        assert!(!text.contains("```"));
        assert!(!text.contains("<br/>"));
    }

    #[test]
    fn document_fields_come_from_frontmatter_or_file_name() {
        let doc = parse_markdown("notes/a.md", "a", "---\ntitle: Alpha\nid: spoofed\nlang: en\n---\nalpha body");
        assert_eq!(doc.title, "Alpha");
        assert_eq!(doc.id.to_string(), "notes/a.md");
        assert_eq!(doc.path.as_deref(), Some("notes/a.md"));
        assert_eq!(doc.content, "alpha body");
        assert_eq!(doc.metadata.get("lang"), Some(&json!("en")));
        assert!(!doc.metadata.contains_key("id"));

        let doc = parse_markdown("b.md", "b", "no frontmatter");
        assert_eq!(doc.title, "b");
        assert!(doc.metadata.is_empty());
    }
}
