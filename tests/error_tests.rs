use axum::http::StatusCode;
use framegate::error::GatewayError;
use framegate::fetch::FetchError;

#[test]
fn status_codes_are_correct() {
    assert_eq!(
        GatewayError::MissingParam("url").status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        GatewayError::InvalidUrl("nope".into()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        GatewayError::Upstream(FetchError::Timeout).status_code(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        GatewayError::UpstreamStatus(503).status_code(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(GatewayError::TooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        GatewayError::SearchUnconfigured.status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        GatewayError::Internal("oops".into()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn fetch_too_large_maps_to_413() {
    let err = GatewayError::from(FetchError::TooLarge(15 * 1024 * 1024));
    assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn fetch_timeout_maps_to_502() {
    let err = GatewayError::from(FetchError::Timeout);
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
}

#[test]
fn error_messages_are_human_readable() {
    assert_eq!(
        GatewayError::MissingParam("url").to_string(),
        "missing query parameter: url"
    );
    assert!(GatewayError::InvalidUrl("ftp://x".into()).to_string().contains("ftp://x"));
    assert_eq!(
        GatewayError::UpstreamStatus(502).to_string(),
        "upstream returned status 502"
    );
}

#[test]
fn into_response_has_json_body() {
    use axum::response::IntoResponse;
    let resp = GatewayError::TooLarge.into_response();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
