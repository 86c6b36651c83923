use framegate::rewrite::{proxy_href, resolve_reference, resource_href, rewrite_html};
use url::Url;

fn target(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn hrefs_are_form_encoded() {
    let url = target("http://example.com/pic.png");
    assert_eq!(
        resource_href(&url),
        "/resource?url=http%3A%2F%2Fexample.com%2Fpic.png"
    );
    assert_eq!(
        proxy_href(&url),
        "/proxy?url=http%3A%2F%2Fexample.com%2Fpic.png"
    );
}

#[test]
fn resolve_relative_against_full_url() {
    let base = target("http://example.com/a/page.html");
    let abs = resolve_reference(&base, "pic.png").unwrap();
    assert_eq!(abs.as_str(), "http://example.com/a/pic.png");

    let abs = resolve_reference(&base, "/root.css").unwrap();
    assert_eq!(abs.as_str(), "http://example.com/root.css");
}

#[test]
fn resolve_absolute_and_protocol_relative() {
    let base = target("https://example.com/page.html");
    let abs = resolve_reference(&base, "http://cdn.example.org/app.js").unwrap();
    assert_eq!(abs.as_str(), "http://cdn.example.org/app.js");

    let abs = resolve_reference(&base, "//cdn.example.org/app.js").unwrap();
    assert_eq!(abs.as_str(), "https://cdn.example.org/app.js");
}

#[test]
fn resolve_rejects_non_http_schemes() {
    let base = target("http://example.com/");
    assert!(resolve_reference(&base, "javascript:void(0)").is_none());
    assert!(resolve_reference(&base, "mailto:a@example.com").is_none());
    assert!(resolve_reference(&base, "data:text/plain,hi").is_none());
}

#[test]
fn basic_page_rewrite_scenario() {
    let url = target("http://example.com/page.html");
    let body = "<html><head></head><body><img src=\"pic.png\"></body></html>";
    let out = rewrite_html(body, &url).unwrap();

    assert!(out.starts_with("<!doctype html>\n"));
    assert!(out.contains("<base href=\"http://example.com\">"));
    assert!(out.contains("<img src=\"/resource?url=http%3A%2F%2Fexample.com%2Fpic.png\">"));
}

#[test]
fn anchors_route_through_proxy_and_stay_in_frame() {
    let url = target("http://example.com/index.html");
    let body = r#"<html><head></head><body><a href="other.html">next</a></body></html>"#;
    let out = rewrite_html(body, &url).unwrap();

    assert!(out.contains("href=\"/proxy?url=http%3A%2F%2Fexample.com%2Fother.html\""));
    assert!(out.contains("target=\"_self\""));
    // nothing points off-gateway
    assert!(!out.contains("href=\"http://example.com/other.html\""));
}

#[test]
fn anchors_with_non_html_extensions_still_proxy() {
    let url = target("http://example.com/");
    let body = r#"<a href="report.pdf">report</a>"#;
    let out = rewrite_html(body, &url).unwrap();
    assert!(out.contains("href=\"/proxy?url=http%3A%2F%2Fexample.com%2Freport.pdf\""));
}

#[test]
fn scripts_links_and_sources_route_through_relay() {
    let url = target("http://example.com/page.html");
    let body = concat!(
        "<html><head>",
        r#"<link rel="stylesheet" href="style.css">"#,
        r#"<script src="https://cdn.example.org/app.js"></script>"#,
        "</head><body>",
        r#"<video><source src="clip.mp4"></video>"#,
        "</body></html>",
    );
    let out = rewrite_html(body, &url).unwrap();

    assert!(out.contains("href=\"/resource?url=http%3A%2F%2Fexample.com%2Fstyle.css\""));
    assert!(out.contains("src=\"/resource?url=https%3A%2F%2Fcdn.example.org%2Fapp.js\""));
    assert!(out.contains("src=\"/resource?url=http%3A%2F%2Fexample.com%2Fclip.mp4\""));
    // rewriting invariant: no asset attribute still carries an absolute
    // external URL
    assert!(!out.contains("src=\"http"));
}

#[test]
fn malformed_and_non_http_attributes_left_untouched() {
    let url = target("http://example.com/");
    let body = concat!(
        r#"<a href="javascript:void(0)">js</a>"#,
        r#"<a href="http://[broken">bad</a>"#,
        r#"<img src="data:image/png;base64,AAAA">"#,
    );
    let out = rewrite_html(body, &url).unwrap();

    assert!(out.contains("href=\"javascript:void(0)\""));
    assert!(out.contains("href=\"http://[broken\""));
    assert!(out.contains("src=\"data:image/png;base64,AAAA\""));
}

#[test]
fn base_tag_is_first_child_of_head() {
    let url = target("https://example.com:8443/x/y.html");
    let body = "<html><head><title>t</title></head><body></body></html>";
    let out = rewrite_html(body, &url).unwrap();

    let head_pos = out.find("<head>").unwrap();
    let base_pos = out.find("<base href=\"https://example.com:8443\">").unwrap();
    let title_pos = out.find("<title>").unwrap();
    assert!(head_pos < base_pos && base_pos < title_pos);
}

#[test]
fn page_without_head_still_rewrites() {
    let url = target("http://example.com/");
    let body = r#"<p><img src="a.png"></p>"#;
    let out = rewrite_html(body, &url).unwrap();
    assert!(out.contains("/resource?url=http%3A%2F%2Fexample.com%2Fa.png"));
    assert!(!out.contains("<base"));
}

#[test]
fn rewrite_is_deterministic() {
    let url = target("http://example.com/page.html");
    let body = r#"<html><head></head><body><img src="pic.png"><a href="b.html">b</a></body></html>"#;
    let a = rewrite_html(body, &url).unwrap();
    let b = rewrite_html(body, &url).unwrap();
    assert_eq!(a, b);
}
