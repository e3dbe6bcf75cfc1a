use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use microsearch_core::{SearchConfig, SearchEngine, SearchOptions};
use microsearch_indexer::bench::{run_queries, write_metrics, BenchmarkResult, LatencySummary};
use microsearch_indexer::add_documents_from_path;
use microsearch_indexer::logging::init_tracing;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "microsearch")]
#[command(about = "Index a folder of markdown notes and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a folder and print ranked results for one query as JSON
    Search {
        /// Folder of markdown files (defaults to ROOT_DOCS_FOLDER)
        #[arg(long)]
        docs: Option<PathBuf>,
        #[arg(long)]
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Restrict matching to these fields, e.g. `title,content`
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Time repeated queries against a folder and write latency metrics
    Bench {
        #[arg(long)]
        docs: Option<PathBuf>,
        /// Number of searches (defaults to BENCHMARK_RUNS or 1000)
        #[arg(long)]
        runs: Option<usize>,
        #[arg(long, value_delimiter = ',', default_value = "test,document,repeated")]
        queries: Vec<String>,
        /// Metrics file (defaults to METRICS_FILE)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = SearchConfig::from_env();

    match cli.command {
        Commands::Search { docs, query, limit, fields } => {
            let engine = load_engine(config, docs)?;
            let opts = SearchOptions { limit, fields: (!fields.is_empty()).then_some(fields) };
            let results = engine.search(&query, &opts);
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Commands::Bench { docs, runs, queries, output } => {
            let engine = load_engine(config, docs)?;
            let runs = runs
                .or_else(|| std::env::var("BENCHMARK_RUNS").ok().and_then(|v| v.parse().ok()))
                .unwrap_or(1000);
            let output = output
                .or_else(|| std::env::var("METRICS_FILE").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("./metrics/search-benchmarks.json"));
            bench(&engine, &queries, runs, &output)
        }
    }
}

fn load_engine(config: SearchConfig, docs: Option<PathBuf>) -> Result<SearchEngine> {
    let docs = docs
        .or_else(|| std::env::var("ROOT_DOCS_FOLDER").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./data/markdown"));
    let mut engine = SearchEngine::new(config);
    let n = add_documents_from_path(&mut engine, &docs)?;
    tracing::info!(documents = n, path = %docs.display(), "index ready");
    Ok(engine)
}

fn bench(engine: &SearchEngine, queries: &[String], runs: usize, output: &Path) -> Result<()> {
    let queries: Vec<String> = queries.iter().map(|q| q.trim().to_string()).filter(|q| !q.is_empty()).collect();
    if queries.is_empty() {
        bail!("no benchmark queries given");
    }
    tracing::info!(runs, queries = queries.len(), "starting benchmark run");
    let Some(summary) = LatencySummary::from_samples(run_queries(engine, &queries, runs)) else {
        bail!("benchmark needs at least one run");
    };

    let result = BenchmarkResult {
        library: "microsearch".into(),
        dataset_size: engine.document_count(),
        runs,
        avg_latency_ms: summary.avg,
        median_latency_ms: summary.median,
        p99_latency_ms: summary.p99,
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
    };
    tracing::info!(
        avg_ms = result.avg_latency_ms,
        median_ms = result.median_latency_ms,
        p99_ms = result.p99_latency_ms,
        "benchmark results"
    );
    write_metrics(output, &[result])?;
    tracing::info!(output = %output.display(), "metrics written");
    Ok(())
}
