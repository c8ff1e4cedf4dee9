use crate::extract::{selector, ExtractError};
use crate::url::{resolve_reference, resolve_source};
use scraper::Html;
use url::Url;

/// Extracts `<a href>` targets as absolute URLs, in document order
///
/// Empty and `#` hrefs are skipped, as are hrefs the URL parser rejects.
/// At most `max_links` URLs are returned.
pub fn extract_links(
    document: &Html,
    base_url: &Url,
    max_links: usize,
) -> Result<Vec<String>, ExtractError> {
    collect_resolved(document, base_url, "a[href]", "href", resolve_reference, max_links)
}

/// Extracts `<img src>` sources as absolute URLs, in document order
///
/// Only empty sources are skipped.
pub fn extract_images(
    document: &Html,
    base_url: &Url,
    max_images: usize,
) -> Result<Vec<String>, ExtractError> {
    collect_resolved(document, base_url, "img[src]", "src", resolve_source, max_images)
}

fn collect_resolved(
    document: &Html,
    base_url: &Url,
    css: &str,
    attr: &str,
    resolve: fn(&str, &Url) -> Option<String>,
    limit: usize,
) -> Result<Vec<String>, ExtractError> {
    let sel = selector(css)?;

    Ok(document
        .select(&sel)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|value| resolve(value, base_url))
        .take(limit)
        .collect())
}
