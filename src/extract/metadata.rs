use crate::extract::{selector, ExtractError};
use scraper::Html;

/// Document-level metadata; missing values are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub language: String,
}

/// Extracts title and meta tags from the document
///
/// | Field | Source | Fallback |
/// |-------|--------|----------|
/// | title | first `<title>`, trimmed | |
/// | description | `meta[name=description]` | `meta[property=og:description]` |
/// | keywords | `meta[name=keywords]` | |
/// | author | `meta[name=author]` | `meta[property=article:author]` |
/// | language | `<html lang>` | `meta[http-equiv=content-language]` |
pub fn extract_metadata(document: &Html) -> Result<PageMetadata, ExtractError> {
    let title = first_text(document, "title")?;

    let description = or_else(meta_content(document, "meta[name='description']")?, || {
        meta_content(document, "meta[property='og:description']")
    })?;

    let keywords = meta_content(document, "meta[name='keywords']")?;

    let author = or_else(meta_content(document, "meta[name='author']")?, || {
        meta_content(document, "meta[property='article:author']")
    })?;

    let root_lang = document
        .root_element()
        .value()
        .attr("lang")
        .unwrap_or_default()
        .to_string();
    let language = or_else(root_lang, || {
        meta_content(document, "meta[http-equiv='content-language']")
    })?;

    Ok(PageMetadata {
        title,
        description,
        keywords,
        author,
        language,
    })
}

fn or_else<F>(value: String, fallback: F) -> Result<String, ExtractError>
where
    F: FnOnce() -> Result<String, ExtractError>,
{
    if value.is_empty() {
        fallback()
    } else {
        Ok(value)
    }
}

/// Trimmed text of the first element matching `css`
fn first_text(document: &Html, css: &str) -> Result<String, ExtractError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default())
}

/// `content` attribute of the first element matching `css`
fn meta_content(document: &Html, css: &str) -> Result<String, ExtractError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|element| element.value().attr("content"))
        .unwrap_or_default()
        .to_string())
}
