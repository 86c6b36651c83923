//! framegate — embedding-aware web proxy gateway.
//! Classifies whether a target page may legally be shown inside a
//! third-party frame, then fetches and rewrites it so every
//! sub-resource and link routes back through the gateway.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod proxy;
pub mod relay;
pub mod rewrite;
pub mod search;

use std::sync::Arc;

/// Shared per-process state. Everything here is immutable after startup
/// except the search pool's rotation cursor, which is an atomic.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub fetcher: fetch::Fetcher,
    pub search: Option<Arc<search::SearchPool>>,
    pub started_at: std::time::Instant,
}
