//! Main-content extraction ladder
//!
//! 1. Semantic containers (`article`, `main`, common content classes/ids,
//!    ARIA main), keeping blocks over 50 characters, until more than 500
//!    characters are gathered.
//! 2. Under 100 characters: every paragraph over 30 characters.
//! 3. Under 50 characters: the whole body text.
//!
//! The result is whitespace-collapsed and capped. The ladder never fails on
//! unstructured markup; an empty body yields an empty string.

use crate::extract::{selector, ExtractError};
use scraper::{ElementRef, Html};

/// Containers tried in order of preference
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".content",
    "#content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".post-body",
    ".article-body",
    "[role='main']",
    ".main-content",
    "#main-content",
];

const MIN_BLOCK_CHARS: usize = 50;
const ENOUGH_CONTENT_CHARS: usize = 500;
const PARAGRAPH_FALLBACK_BELOW: usize = 100;
const MIN_PARAGRAPH_CHARS: usize = 30;
const BODY_FALLBACK_BELOW: usize = 50;

const ELLIPSIS: &str = "...";

/// Accumulates text blocks while tracking length in characters
#[derive(Default)]
struct TextBuffer {
    text: String,
    chars: usize,
}

impl TextBuffer {
    fn push_block(&mut self, block: &str) {
        self.push(block);
        self.push("\n\n");
    }

    fn push(&mut self, s: &str) {
        self.text.push_str(s);
        self.chars += s.chars().count();
    }
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Runs the extraction ladder and post-processes the result
pub fn extract_main_content(document: &Html, max_chars: usize) -> Result<String, ExtractError> {
    let mut buffer = TextBuffer::default();

    for css in CONTENT_SELECTORS {
        let sel = selector(css)?;
        for element in document.select(&sel) {
            let text = trimmed_text(element);
            if text.chars().count() > MIN_BLOCK_CHARS {
                buffer.push_block(&text);
            }
        }
        if buffer.chars > ENOUGH_CONTENT_CHARS {
            break;
        }
    }

    if buffer.chars < PARAGRAPH_FALLBACK_BELOW {
        let sel = selector("p")?;
        for element in document.select(&sel) {
            let text = trimmed_text(element);
            if text.chars().count() > MIN_PARAGRAPH_CHARS {
                buffer.push_block(&text);
            }
        }
    }

    if buffer.chars < BODY_FALLBACK_BELOW {
        let sel = selector("body")?;
        if let Some(body) = document.select(&sel).next() {
            buffer.push(&trimmed_text(body));
        }
    }

    let collapsed = collapse_whitespace(&buffer.text);
    Ok(truncate_chars(&collapsed, max_chars))
}

/// Replaces every whitespace run with one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Caps `text` at `max_chars` characters, appending `...` when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], ELLIPSIS),
        None => text.to_string(),
    }
}
