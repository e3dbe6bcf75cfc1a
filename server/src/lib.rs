use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use microsearch_core::{DocId, SearchConfig, SearchDocument, SearchEngine, SearchOptions, SearchResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
    /// Comma separated, e.g. `title,content`.
    pub fields: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub count: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize, Deserialize)]
pub struct IndexResponse {
    pub indexed: usize,
    pub total: usize,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub documents: usize,
    pub terms: usize,
    pub config: SearchConfig,
}

/// One engine shared by every request. Queries take the read side of the
/// lock; loading and clearing take the write side.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<SearchEngine>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(engine: SearchEngine, admin_token: Option<String>) -> Self {
        Self { engine: Arc::new(RwLock::new(engine)), admin_token }
    }
}

/// Builds the app from the environment: `ADMIN_TOKEN` guards the write
/// endpoints, `CORS_ALLOW_ORIGIN` (comma separated) limits origins.
pub fn build_app(engine: SearchEngine) -> Router {
    let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };
    build_router(AppState::new(engine, admin_token)).layer(cors)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/stats", get(stats_handler))
        .route("/doc/*id", get(doc_handler))
        .route("/index/batch", post(index_batch))
        .route("/index/clear", post(index_clear))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Creates an engine with `config` and, when a folder is given, loads its
/// markdown files.
pub fn load_engine(config: SearchConfig, docs: Option<&std::path::Path>) -> Result<SearchEngine> {
    let mut engine = SearchEngine::new(config);
    if let Some(dir) = docs {
        let n = microsearch_indexer::add_documents_from_path(&mut engine, dir)?;
        tracing::info!(documents = n, path = %dir.display(), "documents loaded");
    }
    Ok(engine)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let fields = params.fields.as_deref().map(|f| {
        f.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect::<Vec<_>>()
    });
    let opts = SearchOptions { limit: params.limit.map(|k| k.min(MAX_LIMIT)), fields };
    let results = state.engine.read().search(&params.q, &opts);
    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), count: results.len(), results })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine.read();
    Json(StatsResponse {
        documents: engine.document_count(),
        terms: engine.index().term_count(),
        config: engine.config().clone(),
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SearchDocument>, (StatusCode, String)> {
    let engine = state.engine.read();
    let by_string = DocId::Str(id.clone());
    let doc = engine.get_document(&by_string).or_else(|| {
        id.parse::<i64>().ok().and_then(|n| engine.get_document(&DocId::Int(n)))
    });
    match doc {
        Some(doc) => Ok(Json(doc.clone())),
        None => Err((StatusCode::NOT_FOUND, "not found".into())),
    }
}

async fn index_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(docs): Json<Vec<SearchDocument>>,
) -> Result<Json<IndexResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let mut engine = state.engine.write();
    let indexed = engine
        .add_documents(docs)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(IndexResponse { indexed, total: engine.document_count() }))
}

async fn index_clear(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IndexResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let mut engine = state.engine.write();
    engine.clear_index();
    Ok(Json(IndexResponse { indexed: 0, total: engine.document_count() }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
