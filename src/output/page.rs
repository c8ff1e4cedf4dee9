//! Plain-text report for a fetched page

use crate::extract::PageContent;

/// Links listed before the remainder is summarized
const LINKS_SHOWN: usize = 10;

/// Images listed before the remainder is summarized
const IMAGES_SHOWN: usize = 5;

/// Formats a fetched page for display
///
/// # Arguments
///
/// * `content` - The distilled page
/// * `include_links` - Whether to list links
/// * `include_images` - Whether to list images
///
/// # Returns
///
/// The report text. Empty metadata fields are left out.
pub fn format_page_content(content: &PageContent, include_links: bool, include_images: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("Web Page Content for: {}\n", content.url));
    out.push_str(&format!("Status Code: {}\n", content.status_code));
    out.push_str(&format!("Content Type: {}\n\n", content.content_type));

    if !content.title.is_empty() {
        out.push_str(&format!("Title: {}\n\n", content.title));
    }

    if !content.description.is_empty() {
        out.push_str(&format!("Description: {}\n\n", content.description));
    }

    let details = [
        ("Author", &content.author),
        ("Language", &content.language),
        ("Keywords", &content.keywords),
    ];
    let mut any_detail = false;
    for (label, value) in details {
        if !value.is_empty() {
            out.push_str(&format!("{}: {}\n", label, value));
            any_detail = true;
        }
    }
    if any_detail {
        out.push('\n');
    }

    if !content.content.is_empty() {
        out.push_str(&format!("Content:\n{}\n\n", content.content));
    }

    if include_links {
        push_capped_list(&mut out, "Links", "links", &content.links, LINKS_SHOWN);
    }

    if include_images {
        push_capped_list(&mut out, "Images", "images", &content.images, IMAGES_SHOWN);
    }

    out
}

fn push_capped_list(out: &mut String, heading: &str, noun: &str, items: &[String], shown: usize) {
    if items.is_empty() {
        return;
    }

    out.push_str(&format!("{} ({} found):\n", heading, items.len()));
    for item in items.iter().take(shown) {
        out.push_str(&format!("- {}\n", item));
    }
    if items.len() > shown {
        out.push_str(&format!("... and {} more {}\n", items.len() - shown, noun));
    }
    out.push('\n');
}
