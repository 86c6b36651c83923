//! Resource relay: fetches one asset on behalf of a rewritten page and
//! returns its bytes under a hard ceiling. Image-class failures degrade
//! to a 1×1 transparent placeholder so rewritten pages never show
//! broken media.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use reqwest::Method;
use tracing::warn;
use url::Url;

use crate::api::UrlParam;
use crate::error::GatewayError;
use crate::fetch::{parse_target, FetchResult};
use crate::AppState;

/// 1×1 transparent PNG served in place of failed image fetches.
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x04, 0x00, 0x00, 0x00, 0xb5, 0x1c, 0x0c, 0x02, 0x00, 0x00, 0x00,
    0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc, 0x5f, 0x0f, 0x00,
    0x02, 0x7f, 0x01, 0xf6, 0x4d, 0xe0, 0xdf, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

const CACHE_CONTROL_SHORT: &str = "public, max-age=300";

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "bmp", "avif",
];

/// GET /resource?url=…
pub async fn relay(State(state): State<AppState>, Query(params): Query<UrlParam>) -> Response {
    let raw = match params.url {
        Some(r) => r,
        None => return GatewayError::MissingParam("url").into_response(),
    };
    let url = match parse_target(&raw) {
        Ok(u) => u,
        Err(e) => return e.into_response(),
    };

    let res = match state.fetcher.fetch(Method::GET, &url).await {
        Ok(r) => r,
        Err(e) => {
            warn!(url = %url, error = %e, "resource fetch failed");
            return failure(&url, None, GatewayError::from(e));
        }
    };

    let content_type = res.content_type().map(str::to_string);
    if !res.status().is_success() {
        let status = res.status().as_u16();
        warn!(url = %url, status, "resource fetch returned error status");
        return failure(&url, content_type.as_deref(), GatewayError::UpstreamStatus(status));
    }

    let body = match read_limited(res, state.config.max_resource_bytes).await {
        Ok(b) => b,
        // Size-policy violations stay explicit even for images; only
        // transport failures get the placeholder treatment.
        Err(e @ GatewayError::TooLarge) => {
            warn!(url = %url, "resource exceeded byte ceiling");
            return e.into_response();
        }
        Err(e) => {
            warn!(url = %url, error = %e, "resource body read failed");
            return failure(&url, content_type.as_deref(), e);
        }
    };

    let ct = content_type.unwrap_or_else(|| "application/octet-stream".into());
    (
        [
            (header::CONTENT_TYPE, ct),
            (header::CACHE_CONTROL, CACHE_CONTROL_SHORT.into()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".into()),
        ],
        body,
    )
        .into_response()
}

/// Read the body under the ceiling. A declared oversize Content-Length
/// short-circuits before any body read; an undeclared one aborts the
/// stream the instant the ceiling is crossed.
async fn read_limited(res: FetchResult, ceiling: u64) -> Result<Vec<u8>, GatewayError> {
    if let Some(len) = res.declared_length() {
        if len > ceiling {
            return Err(GatewayError::TooLarge);
        }
    }
    res.bytes_capped(ceiling).await.map_err(GatewayError::from)
}

/// Image-class failures substitute the placeholder; everything else
/// surfaces an explicit error status.
fn failure(url: &Url, content_type: Option<&str>, err: GatewayError) -> Response {
    if is_image_request(url, content_type) {
        return placeholder_response();
    }
    err.into_response()
}

pub fn placeholder_response() -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, CACHE_CONTROL_SHORT),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        PLACEHOLDER_PNG,
    )
        .into_response()
}

/// Image-class when the upstream said so, or (with no response to ask)
/// when the URL path carries an image extension.
pub fn is_image_request(url: &Url, content_type: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        return ct.trim_start().to_ascii_lowercase().starts_with("image/");
    }
    path_extension(url.path()).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Lowercased extension of the last path segment, if any.
pub fn path_extension(path: &str) -> Option<String> {
    let last = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
