use anyhow::Result;
use axum::Router;
use clap::Parser;
use microsearch_core::SearchConfig;
use microsearch_indexer::logging::init_tracing;
use microsearch_server::{build_app, load_engine};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Folder of markdown files to index at startup (defaults to ROOT_DOCS_FOLDER)
    #[arg(long)]
    docs: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let docs = args.docs.or_else(|| std::env::var("ROOT_DOCS_FOLDER").ok().map(PathBuf::from));
    let engine = load_engine(SearchConfig::from_env(), docs.as_deref())?;
    let app: Router = build_app(engine);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
