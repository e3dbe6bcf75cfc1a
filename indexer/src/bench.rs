use anyhow::Result;
use microsearch_core::{SearchEngine, SearchOptions};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::hint::black_box;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub library: String,
    pub dataset_size: usize,
    pub runs: usize,
    pub avg_latency_ms: f64,
    pub median_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub avg: f64,
    pub median: f64,
    pub p99: f64,
}

impl LatencySummary {
    pub fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(|a, b| a.total_cmp(b));
        let n = samples.len();
        let avg = samples.iter().sum::<f64>() / n as f64;
        let median = samples[n / 2];
        let p99 = samples[(n * 99 / 100).min(n - 1)];
        Some(Self { avg, median, p99 })
    }
}

/// Runs `runs` searches cycling through `queries`, returning per-query
/// latencies in milliseconds.
pub fn run_queries(engine: &SearchEngine, queries: &[String], runs: usize) -> Vec<f64> {
    if queries.is_empty() {
        return Vec::new();
    }
    let opts = SearchOptions::default();
    (0..runs)
        .map(|i| {
            let start = Instant::now();
            black_box(engine.search(&queries[i % queries.len()], &opts));
            start.elapsed().as_secs_f64() * 1000.0
        })
        .collect()
}

pub fn write_metrics(path: &Path, results: &[BenchmarkResult]) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(results)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}
