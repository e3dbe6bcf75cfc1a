use microsearch_core::{SearchConfig, SearchDocument, SearchEngine, SearchOptions, SearchResult};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;

/// Collects formatted log output so tests can assert on it.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn engine(timeout_warn_ms: u64) -> SearchEngine {
    let mut engine = SearchEngine::new(SearchConfig { timeout_warn_ms, ..SearchConfig::default() });
    engine
        .add_documents(vec![
            SearchDocument::new(1, "Rust", "Rust is great. rust systems programming."),
            SearchDocument::new(2, "Learning", "Learning rust."),
            SearchDocument::new(3, "Gardening", "Soil, water and sun."),
        ])
        .unwrap();
    engine
}

fn search_with_logs(engine: &SearchEngine, query: &str) -> (Vec<SearchResult>, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .finish();
    let results = tracing::subscriber::with_default(subscriber, || {
        engine.search(query, &SearchOptions::default())
    });
    (results, logs.contents())
}

#[test]
fn slow_search_warning_fires_past_threshold() {
    let (_, logs) = search_with_logs(&engine(0), "rust");
    assert!(logs.contains("slow search"), "missing warning in: {logs}");
    assert!(logs.contains("threshold_ms=0"));
    assert!(logs.contains("query=\"rust\"") || logs.contains("query=rust"));
}

#[test]
fn fast_search_stays_quiet() {
    let (_, logs) = search_with_logs(&engine(u64::MAX / 2), "rust");
    assert!(!logs.contains("slow search"));
}

#[test]
fn slow_search_warning_never_changes_results() {
    let (slow, logs) = search_with_logs(&engine(0), "rust water");
    let (quiet, _) = search_with_logs(&engine(u64::MAX / 2), "rust water");
    assert!(logs.contains("slow search"));
    assert_eq!(slow.len(), 3);
    assert_eq!(slow, quiet);
}
