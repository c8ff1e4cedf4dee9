use crate::config::types::{Config, FetchConfig, SearchConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Engines accepted by the search API
pub const SEARCH_ENGINES: &[&str] = &[
    "search_std",
    "search_pro",
    "search_pro_sogou",
    "search_pro_quark",
];

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch timeout must be greater than 0".to_string(),
        ));
    }

    if config.max_content_size == 0 {
        return Err(ConfigError::Validation(
            "max_content_size must be >= 1".to_string(),
        ));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay_min must not exceed delay_max, got {}ms > {}ms",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    Ok(())
}

/// Validates the user agent pool
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user agent pool cannot be empty".to_string(),
        ));
    }

    if let Some(index) = config.pool.iter().position(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user agent pool entry {} is blank",
            index
        )));
    }

    Ok(())
}

/// Validates search API configuration
fn validate_search_config(config: &SearchConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Search base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "search timeout must be greater than 0".to_string(),
        ));
    }

    if !is_known_engine(&config.search_engine) {
        return Err(ConfigError::Validation(format!(
            "Unknown search engine '{}', expected one of: {}",
            config.search_engine,
            SEARCH_ENGINES.join(", ")
        )));
    }

    Ok(())
}

/// Returns true if the engine name is accepted by the search API
pub fn is_known_engine(engine: &str) -> bool {
    SEARCH_ENGINES.contains(&engine)
}
