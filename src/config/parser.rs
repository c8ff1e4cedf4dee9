use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use std::path::Path;
use std::time::Duration;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation,
/// so a variable always wins over the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use web_distill::config::load_config;
///
/// let config = load_config(Path::new("web-distill.toml")).unwrap();
/// println!("Max content size: {}", config.fetch.max_content_size);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

impl Config {
    /// Builds a configuration from defaults plus environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        validate(&config)?;
        Ok(config)
    }
}

/// Applies environment overrides using the given variable lookup
///
/// Empty values are treated as unset. Values that fail to parse are
/// reported instead of being dropped.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(value) = get("WEBFETCH_TIMEOUT") {
        config.fetch.timeout_ms = millis_var("WEBFETCH_TIMEOUT", &value)?;
    }
    if let Some(value) = get("WEBFETCH_MAX_CONTENT_SIZE") {
        config.fetch.max_content_size = parse_var("WEBFETCH_MAX_CONTENT_SIZE", &value)?;
    }
    if let Some(value) = get("WEBFETCH_MAX_LINKS") {
        config.fetch.max_links = parse_var("WEBFETCH_MAX_LINKS", &value)?;
    }
    if let Some(value) = get("WEBFETCH_MAX_IMAGES") {
        config.fetch.max_images = parse_var("WEBFETCH_MAX_IMAGES", &value)?;
    }
    if let Some(value) = get("WEBFETCH_USER_AGENT_ROTATE") {
        config.fetch.user_agent_rotate = parse_bool("WEBFETCH_USER_AGENT_ROTATE", &value)?;
    }
    if let Some(value) = get("WEBFETCH_DELAY_MIN") {
        config.fetch.delay_min_ms = millis_var("WEBFETCH_DELAY_MIN", &value)?;
    }
    if let Some(value) = get("WEBFETCH_DELAY_MAX") {
        config.fetch.delay_max_ms = millis_var("WEBFETCH_DELAY_MAX", &value)?;
    }

    if let Some(value) = get("BIGMODEL_TOKEN") {
        config.search.api_token = value;
    }
    if let Some(value) = get("BIGMODEL_BASE_URL") {
        config.search.base_url = value;
    }
    if let Some(value) = get("BIGMODEL_TIMEOUT") {
        config.search.timeout_ms = millis_var("BIGMODEL_TIMEOUT", &value)?;
    }
    if let Some(value) = get("BIGMODEL_SEARCH_ENGINE") {
        config.search.search_engine = value;
    }

    Ok(())
}

/// Parses a duration written as `250ms`, `30s`, `2m`, or bare seconds
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (number, unit_ms) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1000.0)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60_000.0)
    } else {
        (value, 1000.0)
    };

    let number: f64 = number.trim().parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }

    Some(Duration::from_millis((number * unit_ms).round() as u64))
}

fn millis_var(var: &str, value: &str) -> ConfigResult<u64> {
    parse_duration(value)
        .map(|d| d.as_millis() as u64)
        .ok_or_else(|| env_error(var, value))
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| env_error(var, value))
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "no" | "off" => Ok(false),
        _ => Err(env_error(var, value)),
    }
}

fn env_error(var: &str, value: &str) -> ConfigError {
    ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
    }
}
