//! Embeddability classification: may this page be shown inside a frame?
//! The decision comes from the target's own declared headers; absence
//! of proof of safety is treated as unsafe.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Method;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::api::UrlParam;
use crate::fetch::{parse_target, FetchError, Fetcher};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    None,
    BlockedHost,
    XFrameOptions,
    CspFrameAncestors,
    ProbeError,
}

/// Produced fresh per request, never cached — upstream headers can
/// change and no staleness is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedVerdict {
    pub allowed: bool,
    pub reason: DenyReason,
}

impl EmbedVerdict {
    pub fn allow() -> Self {
        Self { allowed: true, reason: DenyReason::None }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self { allowed: false, reason }
    }
}

/// Classify a target URL. Never errors outward: any probe failure maps
/// to a conservative deny with `probe_error`.
pub async fn classify(state: &AppState, url: &Url) -> EmbedVerdict {
    if let Some(host) = url.host_str() {
        if state.config.host_blocked(host) {
            return EmbedVerdict::deny(DenyReason::BlockedHost);
        }
    }
    match probe(&state.fetcher, url).await {
        Ok(verdict) => verdict,
        Err(e) => {
            debug!(url = %url, error = %e, "embed probe failed");
            EmbedVerdict::deny(DenyReason::ProbeError)
        }
    }
}

/// HEAD probe with a single GET retry for servers that reject HEAD.
/// Only headers matter; the body is dropped unread.
async fn probe(fetcher: &Fetcher, url: &Url) -> Result<EmbedVerdict, FetchError> {
    let res = match fetcher.fetch(Method::HEAD, url).await {
        Ok(r) => r,
        Err(_) => fetcher.fetch(Method::GET, url).await?,
    };

    let verdict = evaluate_frame_headers(
        res.header("x-frame-options"),
        res.header("content-security-policy")
            .or_else(|| res.header("content-security-policy-report-only")),
    );
    Ok(verdict)
}

/// Pure policy evaluation over the two frame-restricting headers.
pub fn evaluate_frame_headers(xfo: Option<&str>, csp: Option<&str>) -> EmbedVerdict {
    if let Some(xfo) = xfo {
        let lower = xfo.to_ascii_lowercase();
        if lower.contains("deny") || lower.contains("sameorigin") {
            return EmbedVerdict::deny(DenyReason::XFrameOptions);
        }
    }
    if let Some(csp) = csp {
        if let Some(value) = frame_ancestors_value(csp) {
            if !ancestors_permit_embedding(&value) {
                return EmbedVerdict::deny(DenyReason::CspFrameAncestors);
            }
        }
    }
    EmbedVerdict::allow()
}

/// Extract the `frame-ancestors` directive value, up to the next `;`.
fn frame_ancestors_value(csp: &str) -> Option<String> {
    let lower = csp.to_ascii_lowercase();
    let start = lower.find("frame-ancestors")?;
    let rest = &csp[start + "frame-ancestors".len()..];
    let value = rest.split(';').next().unwrap_or("");
    Some(value.trim().to_string())
}

/// A directive permits embedding here only when it grants `*`, or when
/// `'self'` is the sole listed ancestor. Any explicit ancestor list that
/// is not a bare wildcard excludes this gateway's origin.
fn ancestors_permit_embedding(value: &str) -> bool {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.iter().any(|t| *t == "*") {
        return true;
    }
    tokens.len() == 1 && tokens[0].eq_ignore_ascii_case("'self'")
}

/// GET /can-embed?url=… — JSON verdict. Never a 5xx: internal failures
/// surface as `{ok:false, reason:"error"}`.
pub async fn can_embed(
    State(state): State<AppState>,
    Query(params): Query<UrlParam>,
) -> Response {
    let Some(raw) = params.url else {
        let body = serde_json::json!({ "ok": false, "msg": "missing query parameter: url" });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };
    let Ok(url) = parse_target(&raw) else {
        return Json(serde_json::json!({ "ok": false, "embed": false, "reason": "error" }))
            .into_response();
    };

    let verdict = classify(&state, &url).await;
    let body = if verdict.allowed {
        serde_json::json!({ "ok": true, "embed": true })
    } else {
        serde_json::json!({ "ok": true, "embed": false, "reason": verdict.reason })
    };
    Json(body).into_response()
}
