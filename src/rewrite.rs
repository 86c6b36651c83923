//! HTML rewriting: one streaming pass that re-roots every URL-bearing
//! attribute into the gateway namespace. Anchors stay navigable through
//! `/proxy`; assets are served as bytes through `/resource`.

use lol_html::html_content::ContentType;
use lol_html::{element, HtmlRewriter, Settings};
use url::{form_urlencoded, Url};

#[derive(Debug, thiserror::Error)]
#[error("html rewrite failed: {0}")]
pub struct RewriteError(String);

/// Gateway-relative href that proxies a page through `/proxy`.
pub fn proxy_href(absolute: &Url) -> String {
    encoded("/proxy", absolute)
}

/// Gateway-relative href that relays an asset through `/resource`.
pub fn resource_href(absolute: &Url) -> String {
    encoded("/resource", absolute)
}

fn encoded(path: &str, absolute: &Url) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("url", absolute.as_str())
        .finish();
    format!("{path}?{query}")
}

/// Resolve an attribute value against the full original URL (standard
/// relative-resolution semantics, not merely the origin). Only http(s)
/// results are rewritable; anything else — `javascript:`, `mailto:`,
/// `data:`, malformed — is left for the caller to skip. A single bad
/// attribute must never abort a whole-page rewrite.
pub fn resolve_reference(base: &Url, value: &str) -> Option<Url> {
    let resolved = base.join(value).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Rewrite an HTML document fetched from `target` so all its references
/// route through the gateway:
///
/// - `<base href="{origin}">` is prepended into `<head>` as a safety net
///   for references this pass does not cover;
/// - `a[href]` points back at `/proxy` and is forced to navigate the
///   current frame (`target="_self"`), so traversal stays embedded;
/// - `img[src]`, `script[src]`, `source[src]`, `link[href]` point at
///   `/resource`;
/// - output carries a doctype prefix.
pub fn rewrite_html(html: &str, target: &Url) -> Result<String, RewriteError> {
    let origin = target.origin().ascii_serialization();
    let base_tag = format!("<base href=\"{origin}\">");

    let page_url = target.clone();
    let asset_url = target.clone();
    let link_url = target.clone();

    let mut output: Vec<u8> = Vec::with_capacity(html.len() + 64);
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("head", move |el| {
                    el.prepend(&base_tag, ContentType::Html);
                    Ok(())
                }),
                element!("a[href]", move |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if let Some(abs) = resolve_reference(&page_url, &href) {
                            el.set_attribute("href", &proxy_href(&abs))?;
                            el.set_attribute("target", "_self")?;
                        }
                    }
                    Ok(())
                }),
                element!("img[src], script[src], source[src]", move |el| {
                    if let Some(src) = el.get_attribute("src") {
                        if let Some(abs) = resolve_reference(&asset_url, &src) {
                            el.set_attribute("src", &resource_href(&abs))?;
                        }
                    }
                    Ok(())
                }),
                element!("link[href]", move |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if let Some(abs) = resolve_reference(&link_url, &href) {
                            el.set_attribute("href", &resource_href(&abs))?;
                        }
                    }
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| RewriteError(e.to_string()))?;
    rewriter.end().map_err(|e| RewriteError(e.to_string()))?;

    let mut out = String::with_capacity(output.len() + 16);
    out.push_str("<!doctype html>\n");
    out.push_str(&String::from_utf8_lossy(&output));
    Ok(out)
}
