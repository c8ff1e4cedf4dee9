//! HTML content extraction
//!
//! This module distills a parsed document into a [`PageContent`] record:
//! - Metadata (title, description, keywords, author, language)
//! - Main body text via a three-tier fallback ladder
//! - Links and images resolved to absolute URLs
//!
//! Extraction is pure: no network I/O, and individual fields are
//! best-effort. A missing field is an empty string or an empty list.

mod content;
mod links;
mod metadata;

pub use content::{collapse_whitespace, extract_main_content, truncate_chars, CONTENT_SELECTORS};
pub use links::{extract_images, extract_links};
pub use metadata::{extract_metadata, PageMetadata};

use crate::config::FetchConfig;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Errors that abort extraction outright
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Compiles a CSS selector, reporting which one failed
pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Distilled content of a fetched page
///
/// The network-derived fields (`url`, `status_code`, `content_type`,
/// `headers`) are filled in by the fetcher; the rest come from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// The requested URL
    pub url: String,

    pub status_code: u16,

    /// Content-Type header value, empty if absent
    pub content_type: String,

    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub language: String,

    /// First value of each response header, keyed by lowercase name
    pub headers: BTreeMap<String, String>,

    /// Main body text, whitespace-collapsed and capped
    pub content: String,

    /// Absolute link URLs in document order
    pub links: Vec<String>,

    /// Absolute image URLs in document order
    pub images: Vec<String>,
}

/// Size and count caps applied during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    /// Maximum body text length, in characters
    pub max_content_chars: usize,
    pub max_links: usize,
    pub max_images: usize,
}

impl ExtractLimits {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_content_chars: config.max_content_size,
            max_links: config.max_links,
            max_images: config.max_images,
        }
    }
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Which optional collections to extract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub include_links: bool,
    pub include_images: bool,
}

/// Extracts a page from raw HTML
///
/// # Arguments
///
/// * `html` - The decoded HTML document
/// * `base_url` - URL relative references are resolved against
/// * `limits` - Content size and link/image caps
/// * `options` - Whether links and images are wanted
///
/// # Example
///
/// ```
/// use web_distill::extract::{extract_page, ExtractLimits, ExtractOptions};
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let options = ExtractOptions { include_links: true, include_images: false };
/// let page = extract_page(html, &base_url, &ExtractLimits::default(), options).unwrap();
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_page(
    html: &str,
    base_url: &Url,
    limits: &ExtractLimits,
    options: ExtractOptions,
) -> Result<PageContent, ExtractError> {
    let document = Html::parse_document(html);
    extract_document(&document, base_url, limits, options)
}

/// Extracts a page from an already parsed document
pub fn extract_document(
    document: &Html,
    base_url: &Url,
    limits: &ExtractLimits,
    options: ExtractOptions,
) -> Result<PageContent, ExtractError> {
    let metadata = extract_metadata(document)?;
    let content = extract_main_content(document, limits.max_content_chars)?;

    let links = if options.include_links {
        extract_links(document, base_url, limits.max_links)?
    } else {
        Vec::new()
    };

    let images = if options.include_images {
        extract_images(document, base_url, limits.max_images)?
    } else {
        Vec::new()
    };

    Ok(PageContent {
        title: metadata.title,
        description: metadata.description,
        keywords: metadata.keywords,
        author: metadata.author,
        language: metadata.language,
        content,
        links,
        images,
        ..PageContent::default()
    })
}
