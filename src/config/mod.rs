//! Configuration module for web-distill
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, with environment variables layered on top.
//!
//! # Example
//!
//! ```no_run
//! use web_distill::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("web-distill.toml")).unwrap();
//! println!("Fetch timeout: {:?}", config.fetch.timeout());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, SearchConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, parse_duration};
pub use validation::{is_known_engine, validate, SEARCH_ENGINES};
