//! Read-only HTTP API over the snapshot cache.
//!
//! | route | body |
//! |---|---|
//! | `GET /api/candles` | every stored series, keyed by symbol |
//! | `GET /api/candles/{symbol}` | one series; 404 if it was never written |
//! | `GET /api/symbols` | `{"symbols": [...], "count": n}` |
//! | `GET /health` | symbol count and both update timestamps |
//!
//! Candle responses carry an `ETag` built from the relevant write time.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{Router, http::Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::cache::SnapshotCache;

pub use error::ApiError;

/// Builds the full application router with CORS, gzip and request tracing.
pub fn router(cache: Arc<SnapshotCache>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    routes::routes()
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(cache)
}
