// src/spider/seed.rs
// =============================================================================
// Seed URL validation.
//
// Users type URLs loosely ("example.com", "example.com/docs"), so a missing
// scheme is filled in with http. Anything that still has no host afterwards
// can't be crawled.
// =============================================================================

use crate::error::{CrawlError, Result};
use url::Url;

/// Parses and validates the URL a crawl starts from.
///
/// The host is only checked for presence here; whether it resolves shows up
/// later as a (logged, non-fatal) fetch error.
pub fn parse_seed(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CrawlError::invalid_seed(raw, "empty URL"));
    }

    // "localhost:8080/x" would otherwise parse with "localhost" as the scheme
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut url =
        Url::parse(&candidate).map_err(|e| CrawlError::invalid_seed(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::invalid_seed(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(CrawlError::invalid_seed(raw, "URL has no host")),
    }

    url.set_fragment(None);
    Ok(url)
}
