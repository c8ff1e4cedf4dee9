use serde::{Deserialize, Serialize};

/// A search issued by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,

    /// Engine name; unknown or missing names use the configured default
    pub search_engine: Option<String>,

    /// Ask the API for an intent analysis alongside the results
    pub search_intent: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// JSON body POSTed to the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebSearchRequest {
    pub search_query: String,
    pub search_engine: String,
    pub search_intent: bool,
}

/// Search API response; absent fields decode as empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub id: String,
    pub created: i64,
    pub request_id: String,
    pub search_intent: Vec<SearchIntent>,
    pub search_result: Vec<SearchResultItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchIntent {
    pub query: String,
    pub intent: String,
    pub keywords: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResultItem {
    pub title: String,
    pub content: String,
    pub link: String,
    pub media: String,
    pub icon: String,
    pub refer: String,
    pub publish_date: String,
}
