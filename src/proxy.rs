//! The rewriting proxy pipeline: classify, fetch, rewrite — with a
//! rendered, navigable fallback for every failure class. The guiding
//! principle: the user must always retain a path to the original
//! content, even when the gateway cannot safely display it.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use reqwest::Method;
use tracing::{debug, error, warn};
use url::Url;

use crate::api::UrlParam;
use crate::classify;
use crate::error::GatewayError;
use crate::fetch::parse_target;
use crate::rewrite;
use crate::AppState;

/// GET /proxy?url=…
///
/// Sequential early-return pipeline, every arm terminal:
/// denied embedding → escape document; fetch failure → friendly error
/// page; non-HTML → redirect to the relay; HTML → rewritten document.
pub async fn proxy_page(State(state): State<AppState>, Query(params): Query<UrlParam>) -> Response {
    let raw = match params.url {
        Some(r) => r,
        None => return GatewayError::MissingParam("url").into_response(),
    };
    let url = match parse_target(&raw) {
        Ok(u) => u,
        Err(e) => return e.into_response(),
    };

    // Denied embedding is not an error: hand the browser back to the
    // original site at the top level. Never force-embed a page that
    // signaled refusal.
    let verdict = classify::classify(&state, &url).await;
    if !verdict.allowed {
        debug!(url = %url, reason = ?verdict.reason, "embedding denied");
        return Html(escape_document_html(&url)).into_response();
    }

    let res = match state.fetcher.fetch(Method::GET, &url).await {
        Ok(r) => r,
        Err(e) => {
            warn!(url = %url, error = %e, "page fetch failed");
            return Html(friendly_error_html(&url, StatusCode::BAD_GATEWAY.as_u16()))
                .into_response();
        }
    };
    if !res.status().is_success() {
        let status = res.status().as_u16();
        warn!(url = %url, status, "page fetch returned error status");
        return Html(friendly_error_html(&url, status)).into_response();
    }

    // Non-HTML top-level targets (a raw image, a PDF, a video file) are
    // bytes, not documents to rewrite.
    let is_html = res.content_type().is_some_and(|ct| ct.contains("text/html"));
    if !is_html {
        return Redirect::temporary(&rewrite::resource_href(&url)).into_response();
    }

    let body = match res.text().await {
        Ok(b) => b,
        Err(e) => {
            warn!(url = %url, error = %e, "page body read failed");
            return Html(friendly_error_html(&url, StatusCode::BAD_GATEWAY.as_u16()))
                .into_response();
        }
    };

    match rewrite::rewrite_html(&body, &url) {
        Ok(html) => {
            ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
        }
        Err(e) => {
            error!(url = %url, error = %e, "rewrite failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_html(&url))).into_response()
        }
    }
}

/// Minimal document whose sole effect is to navigate the *top-level*
/// browsing context (never the iframe) to the original URL. This is a
/// protocol-level signal to the browser, not an error page — preserved
/// verbatim as the denial rendering contract.
pub fn escape_document_html(target: &Url) -> String {
    // JSON string escaping keeps the URL safe inside the inline script.
    let escaped =
        serde_json::to_string(target.as_str()).unwrap_or_else(|_| "\"about:blank\"".into());
    format!("<html><body><script>window.top.location.href={escaped};</script></body></html>")
}

/// Status 200 on purpose: a real error status would make the iframe
/// show the browser's network-error interstitial instead of this page.
pub fn friendly_error_html(target: &Url, upstream_status: u16) -> String {
    format!(
        "<html><body style=\"font-family:Arial;padding:20px;\">\
         <h3>This page cannot be shown embedded</h3>\
         <p>The gateway could not fetch the target site (status {upstream_status}).</p>\
         <p><a href=\"{target}\" target=\"_blank\" rel=\"noopener\">\
         Open the original site in a new tab</a></p>\
         </body></html>"
    )
}

/// Last-resort page for unexpected failures while rewriting.
pub fn fallback_html(target: &Url) -> String {
    format!(
        "<html><body style=\"font-family:Arial;padding:20px;\">\
         <h3>Proxying failed</h3>\
         <p>The gateway hit an internal error while processing this page.</p>\
         <p><a href=\"{target}\" target=\"_blank\" rel=\"noopener\">\
         Open the original site in a new tab</a></p>\
         </body></html>"
    )
}
