//! Plain-text report for search results

use crate::search::SearchResponse;

/// Formats a search response for display
pub fn format_search_response(response: &SearchResponse, query: &str, engine: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("Search Results for: {}\n", query));
    out.push_str(&format!("Search Engine: {}\n", engine));
    out.push_str(&format!("Request ID: {}\n\n", response.request_id));

    if !response.search_intent.is_empty() {
        out.push_str("Search Intent Analysis:\n");
        for intent in &response.search_intent {
            out.push_str(&format!("- Query: {}\n", intent.query));
            out.push_str(&format!("  Intent: {}\n", intent.intent));
            out.push_str(&format!("  Keywords: {}\n\n", intent.keywords));
        }
    }

    if response.search_result.is_empty() {
        out.push_str("No search results found.\n");
        return out;
    }

    out.push_str("Search Results:\n");
    for (i, result) in response.search_result.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, result.title));
        out.push_str(&format!("   URL: {}\n", result.link));
        if !result.content.is_empty() {
            out.push_str(&format!("   Summary: {}\n", result.content));
        }
        if !result.publish_date.is_empty() {
            out.push_str(&format!("   Published: {}\n", result.publish_date));
        }
        if !result.refer.is_empty() {
            out.push_str(&format!("   Source: {}\n", result.refer));
        }
        out.push('\n');
    }

    out
}
