//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the base URL and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ConfigValidationError>>
//! - `retries.max_attempts = 0` is accepted; the retry budget normalises it to 1

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("connection.base_url is empty")]
    EmptyBaseUrl,

    #[error("connection.base_url {url:?} is not a valid URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("connection.base_url scheme {0:?} is not http or https")]
    UnsupportedScheme(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    let base_url = config.connection.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigValidationError::EmptyBaseUrl);
    } else {
        match Url::parse(base_url) {
            Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
                errors.push(ConfigValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            Ok(_) => {}
            Err(e) => errors.push(ConfigValidationError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ConfigValidationError::ZeroRequestTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
