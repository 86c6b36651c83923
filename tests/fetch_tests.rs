use framegate::fetch::parse_target;

#[test]
fn accepts_http_and_https() {
    assert!(parse_target("http://example.com/page.html").is_ok());
    assert!(parse_target("https://example.com:8443/a?b=c").is_ok());
}

#[test]
fn rejects_other_schemes() {
    assert!(parse_target("ftp://example.com/file").is_err());
    assert!(parse_target("javascript:alert(1)").is_err());
    assert!(parse_target("file:///etc/passwd").is_err());
    assert!(parse_target("data:text/plain,hello").is_err());
}

#[test]
fn rejects_relative_and_malformed() {
    assert!(parse_target("/just/a/path").is_err());
    assert!(parse_target("example.com/page").is_err());
    assert!(parse_target("").is_err());
    assert!(parse_target("http://").is_err());
}

#[test]
fn invalid_url_is_a_400() {
    use axum::http::StatusCode;
    let err = parse_target("not a url").unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}
