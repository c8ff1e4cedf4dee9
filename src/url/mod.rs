//! URL handling module for web-distill
//!
//! This module validates fetch targets and resolves the relative references
//! found in fetched documents.

use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes the fetch pipeline is willing to request
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Parses and validates a URL as a fetch target
///
/// # Validation Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject any scheme other than `http` or `https`
///
/// No network I/O happens here; a rejected URL never reaches the transport.
///
/// # Examples
///
/// ```
/// use web_distill::url::validate_fetch_url;
///
/// assert!(validate_fetch_url("https://example.com/").is_ok());
/// assert!(validate_fetch_url("ftp://example.com/").is_err());
/// ```
pub fn validate_fetch_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    Ok(url)
}

/// Resolves an `href`/`src` attribute value against the page URL
///
/// Returns `None` for empty references, the bare `#` placeholder, and
/// anything the URL parser rejects. Everything else is joined as written.
pub fn resolve_reference(reference: &str, base_url: &Url) -> Option<String> {
    if reference.is_empty() || reference == "#" {
        return None;
    }

    join(reference, base_url)
}

/// Resolves an `<img src>` value against the page URL
///
/// Only empty sources are skipped; `#` resolves like any other fragment.
pub fn resolve_source(source: &str, base_url: &Url) -> Option<String> {
    if source.is_empty() {
        return None;
    }

    join(source, base_url)
}

fn join(reference: &str, base_url: &Url) -> Option<String> {
    base_url.join(reference).ok().map(|absolute| absolute.to_string())
}
