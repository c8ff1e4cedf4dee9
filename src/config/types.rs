use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for web-distill
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub search: SearchConfig,
}

/// Web page fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Base per-attempt timeout (milliseconds), jittered by ±20% per attempt
    pub timeout_ms: u64,

    /// Maximum body text length in characters
    pub max_content_size: usize,

    /// Maximum number of links returned
    pub max_links: usize,

    /// Maximum number of images returned
    pub max_images: usize,

    /// Enables the randomized pre-request delay
    pub user_agent_rotate: bool,

    /// Lower bound of the pre-request delay (milliseconds)
    pub delay_min_ms: u64,

    /// Upper bound of the pre-request delay (milliseconds)
    pub delay_max_ms: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay_min(&self) -> Duration {
        Duration::from_millis(self.delay_min_ms)
    }

    pub fn delay_max(&self) -> Duration {
        Duration::from_millis(self.delay_max_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_content_size: 5000,
            max_links: 50,
            max_images: 20,
            user_agent_rotate: true,
            delay_min_ms: 1000,
            delay_max_ms: 3000,
        }
    }
}

/// User agent pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Browser user agents picked from at random for each fetch
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: crate::fetch::default_user_agents(),
        }
    }
}

/// Web-search API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Bearer token for the search API
    pub api_token: String,

    /// Search endpoint
    pub base_url: String,

    /// Request timeout (milliseconds)
    pub timeout_ms: u64,

    /// Engine used when a request does not name a valid one
    pub search_engine: String,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: "https://open.bigmodel.cn/api/paas/v4/web_search".to_string(),
            timeout_ms: 30_000,
            search_engine: "search_std".to_string(),
        }
    }
}
