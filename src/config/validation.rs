//! Configuration validation logic.

use regex::Regex;
use scraper::Selector;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Upper bound for simultaneously open sessions.
const MAX_CONCURRENCY: usize = 256;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_concurrency(config.options.concurrency)?;
    validate_timeout("request_timeout_seconds", config.options.request_timeout_seconds)?;
    validate_timeout("viewer_timeout_seconds", config.options.viewer_timeout_seconds)?;
    validate_non_empty("accept_language", &config.options.accept_language)?;
    validate_non_empty("user_agent", &config.options.user_agent)?;
    validate_url_pattern(&config.viewer.url_pattern)?;
    validate_non_empty("error_title_marker", &config.viewer.error_title_marker)?;
    validate_embed_tags(&config.viewer.embed_tags)?;

    Ok(())
}

/// Validate the permit count.
pub fn validate_concurrency(concurrency: usize) -> Result<()> {
    if concurrency == 0 || concurrency > MAX_CONCURRENCY {
        return Err(Error::ConfigValidation {
            field: "concurrency".to_string(),
            message: format!(
                "Concurrency must be between 1 and {} (got {})",
                MAX_CONCURRENCY, concurrency
            ),
        });
    }
    Ok(())
}

fn validate_timeout(field: &str, seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Timeout must be at least 1 second".to_string(),
        });
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::MissingConfig(field.to_string()));
    }
    Ok(())
}

/// Validate the viewer URL pattern.
pub fn validate_url_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(Error::MissingConfig("url_pattern".to_string()));
    }

    Regex::new(pattern).map_err(|e| Error::ConfigValidation {
        field: "url_pattern".to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}

/// Validate the embed tag selectors.
pub fn validate_embed_tags(tags: &[String]) -> Result<()> {
    if tags.is_empty() {
        return Err(Error::MissingConfig(
            "embed_tags (at least one element name required)".to_string(),
        ));
    }

    for tag in tags {
        if Selector::parse(tag).is_err() {
            return Err(Error::ConfigValidation {
                field: "embed_tags".to_string(),
                message: format!("'{}' is not a valid selector", tag),
            });
        }
    }

    Ok(())
}

/// Parse a `key=value` cookie argument.
pub fn parse_cookie_arg(input: &str) -> Result<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::ConfigValidation {
            field: "cookie".to_string(),
            message: format!("Expected key=value, got '{}'", input),
        }),
    }
}
