use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{api::error::ApiError, cache::SnapshotCache};

pub fn routes() -> Router<Arc<SnapshotCache>> {
    Router::new()
        .route("/api/candles", get(all_candles))
        .route("/api/candles/{symbol}", get(symbol_candles))
        .route("/api/symbols", get(symbols))
        .route("/health", get(health))
}

/// Weak validator derived from a write time: the quoted Unix seconds.
pub fn etag(at: DateTime<Utc>) -> String {
    format!("\"{}\"", at.timestamp())
}

fn with_etag(mut response: Response, at: DateTime<Utc>) -> Response {
    if let Ok(value) = HeaderValue::from_str(&etag(at)) {
        response.headers_mut().insert(header::ETAG, value);
    }
    response
}

async fn all_candles(State(cache): State<Arc<SnapshotCache>>) -> Response {
    // Read the timestamp first so the tag never claims data newer than the body.
    let updated_at = cache.data_updated_at();
    let all = cache.get_all_series();
    with_etag(Json(all).into_response(), updated_at)
}

async fn symbol_candles(
    State(cache): State<Arc<SnapshotCache>>,
    Path(symbol): Path<String>,
) -> Result<Response, ApiError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(ApiError::BadRequest("symbol required".into()));
    }

    // Exact match first: some listed names are mixed case (kPEPE).
    let upper = symbol.to_uppercase();
    let entry = cache
        .get_series(symbol)
        .or_else(|| cache.get_series(&upper))
        .ok_or_else(|| ApiError::NotFound(format!("symbol not found: {upper}")))?;
    let last_update = entry.last_update;
    Ok(with_etag(Json(entry).into_response(), last_update))
}

#[derive(Serialize)]
struct SymbolsBody {
    symbols: Vec<String>,
    count: usize,
}

async fn symbols(State(cache): State<Arc<SnapshotCache>>) -> Json<SymbolsBody> {
    let symbols = cache.get_symbols();
    Json(SymbolsBody {
        count: symbols.len(),
        symbols,
    })
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    symbol_count: usize,
    last_update: DateTime<Utc>,
    symbol_update: DateTime<Utc>,
}

async fn health(State(cache): State<Arc<SnapshotCache>>) -> Json<HealthBody> {
    let snapshot = cache.symbols_snapshot();
    Json(HealthBody {
        status: "healthy",
        symbol_count: snapshot.symbols.len(),
        last_update: cache.data_updated_at(),
        symbol_update: snapshot.last_fetch,
    })
}
