//! Report formatting
//!
//! This module renders library results as plain text for the CLI:
//! - Fetched pages, with capped link and image listings
//! - Search responses, with the optional intent analysis

mod page;
mod search;

pub use page::format_page_content;
pub use search::format_search_response;
