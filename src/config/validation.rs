use super::models::{Config, DocumentConfig, FetchConfig};
use thiserror::Error;

/// Upper bound for download attempts per remote target
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Directive marker must not be empty")]
    EmptyDirectiveMarker,

    #[error("Directive marker '{marker}' is shadowed by comment prefix '{prefix}'")]
    MarkerShadowedByComment { marker: String, prefix: String },

    #[error("max_retries must be between 1 and 10 (got {0})")]
    InvalidMaxRetries(u32),

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },

    #[error("User agent must not be empty")]
    EmptyUserAgent,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_document(&config.document)?;
    validate_fetch(&config.fetch)?;
    Ok(())
}

/// Every directive line must remain reachable by the scanner
fn validate_document(document: &DocumentConfig) -> Result<(), ValidationError> {
    if document.directive_marker.is_empty() {
        return Err(ValidationError::EmptyDirectiveMarker);
    }

    let prefix = &document.comment_prefix;
    if !prefix.is_empty() && document.directive_marker.starts_with(prefix.as_str()) {
        return Err(ValidationError::MarkerShadowedByComment {
            marker: document.directive_marker.clone(),
            prefix: prefix.clone(),
        });
    }

    Ok(())
}

fn validate_fetch(fetch: &FetchConfig) -> Result<(), ValidationError> {
    if fetch.max_retries == 0 || fetch.max_retries > MAX_RETRIES_LIMIT {
        return Err(ValidationError::InvalidMaxRetries(fetch.max_retries));
    }

    if fetch.request_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "request_timeout".to_string(),
        });
    }

    if fetch.connect_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "connect_timeout".to_string(),
        });
    }

    if fetch.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    Ok(())
}
