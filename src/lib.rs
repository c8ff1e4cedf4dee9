//! web-distill: web search and page distillation
//!
//! This crate fetches arbitrary web pages while shaping requests to look like
//! ordinary browser traffic, then distills the HTML into a size-bounded
//! record (title, metadata, body text, links, images). It also wraps a
//! remote web-search API.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod search;
pub mod url;

use thiserror::Error;

/// Top-level error type for web-distill operations
#[derive(Debug, Error)]
pub enum WebDistillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad category of a fetch failure, for callers rendering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    InvalidUrl,
    UnsupportedScheme,
    Transport,
    RateLimited,
    Blocked,
    Decompression,
    Parse,
    Cancelled,
}

/// Errors surfaced by the fetch pipeline
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("Failed to fetch page after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    #[error("Request was rate limited after {attempts} attempts")]
    RateLimited { attempts: u32, status: Option<u16> },

    #[error("Request was blocked, status: {status}")]
    Blocked { status: u16, waf: Option<String> },

    #[error("Failed to decompress response: {0}")]
    Decompression(String),

    #[error("Failed to parse HTML: {0}")]
    Parse(String),

    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::InvalidUrl { .. } => FetchErrorKind::InvalidUrl,
            Self::UnsupportedScheme { .. } => FetchErrorKind::UnsupportedScheme,
            Self::Transport { .. } => FetchErrorKind::Transport,
            Self::RateLimited { .. } => FetchErrorKind::RateLimited,
            Self::Blocked { .. } => FetchErrorKind::Blocked,
            Self::Decompression(_) => FetchErrorKind::Decompression,
            Self::Parse(_) => FetchErrorKind::Parse,
            Self::Cancelled => FetchErrorKind::Cancelled,
        }
    }

    /// Returns the HTTP status code that triggered the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status, .. } => *status,
            Self::Blocked { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the failure happened before any network I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::UnsupportedScheme { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: String, value: String },

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors from the web-search API client
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API token is not configured")]
    MissingToken,

    #[error("Search API token is not a valid header value")]
    InvalidToken,

    #[error("Failed to execute request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request was rate limited, status: {status}")]
    RateLimited { status: u16 },

    #[error("Request was blocked, status: {status}")]
    Blocked { status: u16 },

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Search cancelled")]
    Cancelled,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for web-distill operations
pub type Result<T> = std::result::Result<T, WebDistillError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::PageContent;
pub use fetch::{FetchRequest, WebFetcher};
pub use search::{SearchClient, SearchRequest, SearchResponse};

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_fetch() -> Result<()> {
        Err(FetchError::Blocked {
            status: 403,
            waf: Some("cloudflare".to_string()),
        })?;
        Ok(())
    }

    fn fail_search() -> Result<()> {
        Err(SearchError::MissingToken)?;
        Ok(())
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err = fail_fetch().unwrap_err();
        assert!(matches!(err, WebDistillError::Fetch(_)));
        assert_eq!(err.to_string(), "Request was blocked, status: 403");
    }

    #[test]
    fn test_search_error_is_wrapped() {
        let err = fail_search().unwrap_err();
        assert!(matches!(err, WebDistillError::Search(SearchError::MissingToken)));
        assert_eq!(
            err.to_string(),
            "Search failed: Search API token is not configured"
        );
    }

    #[test]
    fn test_config_and_json_errors_convert() {
        let err: WebDistillError = ConfigError::Validation("timeout-ms must be > 0".into()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Validation error: timeout-ms must be > 0"
        );

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: WebDistillError = json.into();
        assert!(matches!(err, WebDistillError::Json(_)));
    }
}
