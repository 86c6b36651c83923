//! HTTP surface: router assembly plus the service index.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{classify, proxy, relay, search, AppState};

/// Common `?url=` query parameter. Optional here so each handler can
/// answer a missing value with its own 400 shape.
#[derive(Deserialize)]
pub struct UrlParam {
    pub url: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/proxy", get(proxy::proxy_page))
        .route("/resource", get(relay::relay))
        .route("/can-embed", get(classify::can_embed))
        .route("/search", get(search::search))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / — service index with a config summary and endpoint list.
async fn index(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "framegate",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "config": {
            "blocked_hosts": state.config.blocked_hosts.clone(),
            "max_resource_bytes": state.config.max_resource_bytes,
            "fetch_timeout_ms": state.config.fetch_timeout.as_millis() as u64,
            "search_keys": state.search.as_ref().map_or(0, |p| p.len()),
        },
        "endpoints": {
            "GET /proxy?url=": "rewritten HTML, or a top-level-navigation escape document",
            "GET /resource?url=": "raw asset bytes with content-type passthrough",
            "GET /can-embed?url=": "frame-embedding verdict as JSON",
            "GET /search?q=": "keyword search via the rotating key pool",
        },
    }))
}
