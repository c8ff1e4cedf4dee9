//! Web-search API client
//!
//! Wraps a bearer-token JSON search endpoint. One POST per search, sent
//! with the same browser-like headers the page fetcher uses.

mod client;
mod types;

pub use client::SearchClient;
pub use types::{SearchIntent, SearchRequest, SearchResponse, SearchResultItem, WebSearchRequest};
