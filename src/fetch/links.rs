// src/fetch/links.rs
// =============================================================================
// This module extracts same-host links from an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Only <a href="..."> counts as a link. <link>, <img>, <script> and friends
// point at assets, not pages, so they never reach the site tree.
//
// Rust concepts:
// - Iterators: For processing collections
// - Option/Result: an href can be skipped (None) or broken (Err)
// =============================================================================

use crate::error::FetchError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

// Extracts every link on `page`'s host from the HTML
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   page: the URL the HTML came from (for resolving relative links,
//         unless the document declares a <base href>)
//
// Returns: absolute URLs, fragment removed, in document order, no repeats
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='https://other.com/'>x</a>"
//   page = "https://example.com/page"
//   result = ["https://example.com/docs"]
pub fn same_host_links(html: &str, page: &Url) -> Result<Vec<Url>, FetchError> {
    let anchors = selector("a[href]", page)?;

    let document = Html::parse_document(html);
    let base = document_base(&document, page)?;
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let link = match resolve_link(&base, href) {
            Ok(Some(link)) => link,
            Ok(None) => continue,
            Err(err) => {
                // One broken href shouldn't cost us the rest of the page
                debug!(error = %err, "skipping malformed href");
                continue;
            }
        };

        if is_same_host(page, &link) && seen.insert(link.as_str().to_string()) {
            links.push(link);
        }
    }

    Ok(links)
}

// Relative hrefs resolve against <base href="..."> when the page has one.
// The first <base> wins; one that can't be parsed is ignored.
fn document_base(document: &Html, page: &Url) -> Result<Url, FetchError> {
    let base = selector("base[href]", page)?;

    let declared = document
        .select(&base)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());

    let Some(href) = declared else {
        return Ok(page.clone());
    };

    match page.join(href) {
        Ok(url) => Ok(url),
        Err(err) => {
            debug!(%page, href, error = %err, "ignoring malformed <base href>");
            Ok(page.clone())
        }
    }
}

fn selector(css: &str, page: &Url) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse {
        url: page.clone(),
        reason: e.to_string(),
    })
}

// Resolves a link (possibly relative) to an absolute URL
//
// Returns:
//   Ok(Some(url)) for something worth following
//   Ok(None) for hrefs that never point at a page (anchors, mailto:, ...)
//   Err(..) when the href can't be turned into a URL at all
fn resolve_link(page: &Url, href: &str) -> Result<Option<Url>, FetchError> {
    let href = href.trim();

    // Skip in-page anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return Ok(None);
    }

    // join() handles both absolute hrefs and relative ones like "../other"
    let mut url = page.join(href).map_err(|source| FetchError::Href {
        page: page.clone(),
        href: href.to_string(),
        source,
    })?;

    // "/a#intro" and "/a#usage" are the same page
    url.set_fragment(None);
    Ok(Some(url))
}

// Same hostname, http(s) only. Ports are not compared.
pub(crate) fn is_same_host(page: &Url, link: &Url) -> bool {
    matches!(link.scheme(), "http" | "https")
        && link.host_str().is_some()
        && link.host_str() == page.host_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn links(html: &str, base: &str) -> Vec<String> {
        same_host_links(html, &page(base))
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_resolve_relative_link() {
        let found = links(r#"<a href="/docs">Docs</a>"#, "https://example.com/page");
        assert_eq!(found, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_resolve_parent_relative_link() {
        let found = links(
            r#"<a href="../about">About</a>"#,
            "https://example.com/blog/post/",
        );
        assert_eq!(found, vec!["https://example.com/blog/about"]);
    }

    #[test]
    fn test_external_host_excluded() {
        let html = r#"
            <a href="/a">A</a>
            <a href="http://other.com/x">Other</a>
            <a href="https://sub.example.com/y">Sub</a>
        "#;
        let found = links(html, "http://example.com/");
        assert_eq!(found, vec!["http://example.com/a"]);
    }

    #[test]
    fn test_skip_mailto_and_javascript() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+123">Call</a>
            <a href="javascript:void(0)">Nothing</a>
            <a href="#section">Jump</a>
        "##;
        assert!(links(html, "https://example.com/").is_empty());
    }

    #[test]
    fn test_base_href_changes_resolution() {
        let html = r#"
            <head><base href="/docs/"></head>
            <a href="guide">Guide</a>
            <a href="/about">About</a>
        "#;
        let found = links(html, "https://example.com/index.html");
        assert_eq!(
            found,
            vec!["https://example.com/docs/guide", "https://example.com/about"]
        );
    }

    #[test]
    fn test_base_href_on_other_host_still_filtered_by_page_host() {
        let html = r#"
            <base href="https://cdn.example.net/">
            <a href="guide">Guide</a>
            <a href="https://example.com/kept">Kept</a>
        "#;
        let found = links(html, "https://example.com/");
        assert_eq!(found, vec!["https://example.com/kept"]);
    }

    #[test]
    fn test_fragment_stripped_and_deduplicated() {
        let html = r#"
            <a href="/guide#install">Install</a>
            <a href="/guide#usage">Usage</a>
            <a href="/guide">Guide</a>
        "#;
        let found = links(html, "https://example.com/");
        assert_eq!(found, vec!["https://example.com/guide"]);
    }

    #[test]
    fn test_only_anchor_elements() {
        let html = r#"
            <link href="/style.css" rel="stylesheet">
            <img src="/logo.png">
            <area href="/map">
            <a href="/real">Real</a>
        "#;
        let found = links(html, "https://example.com/");
        assert_eq!(found, vec!["https://example.com/real"]);
    }

    #[test]
    fn test_query_kept() {
        let found = links(r#"<a href="/search?q=rust">S</a>"#, "https://example.com/");
        assert_eq!(found, vec!["https://example.com/search?q=rust"]);
    }

    #[test]
    fn test_malformed_href_skipped() {
        let html = r#"
            <a href="http://[::1">Broken</a>
            <a href="/fine">Fine</a>
        "#;
        let found = links(html, "https://example.com/");
        assert_eq!(found, vec!["https://example.com/fine"]);
    }

    #[test]
    fn test_malformed_href_reports_page() {
        let base = page("https://example.com/page");
        let err = resolve_link(&base, "http://[::1").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("https://example.com/page"), "{message}");
        assert!(message.contains("http://[::1"), "{message}");
    }

    #[test]
    fn test_same_host_ignores_port() {
        let a = page("http://127.0.0.1:8080/");
        let b = page("http://127.0.0.1:9090/x");
        assert!(is_same_host(&a, &b));
    }
}
