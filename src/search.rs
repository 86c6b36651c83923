//! Keyword search across a rotating key pool. The rotation cursor is an
//! explicit atomic owned by the pool — never module-level mutable
//! state. Quota exhaustion (429) and every completed attempt advance
//! it, so load spreads across the configured key pairs.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Method;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;
use url::Url;

use crate::error::GatewayError;
use crate::fetch::Fetcher;
use crate::AppState;

const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Clone)]
pub struct SearchKey {
    pub key: String,
    pub cx: String,
}

pub struct SearchPool {
    keys: Vec<SearchKey>,
    cursor: AtomicUsize,
}

impl SearchPool {
    /// Panics when `keys` is empty: `cursor_position` reduces modulo
    /// the pool size, and an unconfigured pool is represented as
    /// `None`, never as an empty one.
    pub fn new(keys: Vec<SearchKey>) -> Self {
        assert!(!keys.is_empty(), "search pool requires at least one key pair");
        Self { keys, cursor: AtomicUsize::new(0) }
    }

    /// Collects `FRAMEGATE_SEARCH_KEY_n` / `FRAMEGATE_SEARCH_CX_n`
    /// pairs (n = 1, 2, …) up to the first gap. `None` when no complete
    /// pair is configured.
    pub fn from_env() -> Option<Self> {
        let mut keys = Vec::new();
        for n in 1.. {
            let key = std::env::var(format!("FRAMEGATE_SEARCH_KEY_{n}")).ok();
            let cx = std::env::var(format!("FRAMEGATE_SEARCH_CX_{n}")).ok();
            match (key, cx) {
                (Some(key), Some(cx)) if !key.is_empty() && !cx.is_empty() => {
                    keys.push(SearchKey { key, cx });
                }
                _ => break,
            }
        }
        if keys.is_empty() {
            None
        } else {
            Some(Self::new(keys))
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key pair at the rotation cursor, without advancing.
    pub fn current(&self) -> &SearchKey {
        &self.keys[self.cursor_position()]
    }

    /// Advance the rotation cursor to the next pair.
    pub fn advance(&self) {
        self.cursor.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor.load(Ordering::Relaxed) % self.keys.len()
    }
}

/// Resolve a query against the pool: at most one attempt per key pair.
/// 429 rotates and retries; other upstream errors answer immediately.
pub async fn resolve(pool: &SearchPool, fetcher: &Fetcher, q: &str) -> serde_json::Value {
    for _ in 0..pool.len() {
        let url = cse_url(q, pool.current());
        match fetcher.fetch(Method::GET, &url).await {
            Ok(res) if res.status() == StatusCode::TOO_MANY_REQUESTS => {
                warn!("search key quota exhausted, rotating");
                pool.advance();
            }
            Ok(res) if !res.status().is_success() => {
                let status = res.status().as_u16();
                let body = res.text().await.unwrap_or_default();
                return serde_json::json!({
                    "ok": false,
                    "msg": format!("search api error {status}"),
                    "body": body,
                });
            }
            Ok(res) => {
                let data = res
                    .text()
                    .await
                    .ok()
                    .and_then(|t| serde_json::from_str::<serde_json::Value>(&t).ok());
                pool.advance();
                return match data {
                    Some(data) => serde_json::json!({ "ok": true, "data": data }),
                    None => serde_json::json!({
                        "ok": false,
                        "msg": "search response was not valid JSON",
                    }),
                };
            }
            Err(e) => {
                warn!(error = %e, "search fetch failed, rotating");
                pool.advance();
            }
        }
    }
    serde_json::json!({ "ok": false, "msg": "all search keys or network attempts failed" })
}

fn cse_url(q: &str, pair: &SearchKey) -> Url {
    let mut url = Url::parse(CSE_ENDPOINT).expect("static endpoint URL");
    url.query_pairs_mut()
        .append_pair("q", q)
        .append_pair("key", &pair.key)
        .append_pair("cx", &pair.cx)
        .append_pair("safe", "off")
        .append_pair("num", "10");
    url
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /search?q=…
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(q) = params.q.filter(|q| !q.is_empty()) else {
        let body = serde_json::json!({ "ok": false, "msg": "missing query parameter: q" });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };
    let Some(ref pool) = state.search else {
        let err = GatewayError::SearchUnconfigured;
        let body = serde_json::json!({ "ok": false, "msg": err.to_string() });
        return (err.status_code(), Json(body)).into_response();
    };

    Json(resolve(pool, &state.fetcher, &q).await).into_response()
}
