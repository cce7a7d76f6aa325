//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check addresses and header values are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PlaygroundConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use reqwest::header::HeaderValue;
use thiserror::Error;

use crate::config::schema::{PlaygroundConfig, ProxySettings};

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("proxy.path must start with '/', got {0:?}")]
    InvalidPath(String),

    #[error("proxy.user_agent is not a valid header value")]
    InvalidUserAgent,
}

pub fn validate_config(config: &PlaygroundConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    errors.extend(proxy_errors(&config.proxy));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks for the reloadable `[proxy]` section alone.
pub fn validate_proxy_settings(settings: &ProxySettings) -> Result<(), Vec<ValidationError>> {
    let errors = proxy_errors(settings);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn proxy_errors(settings: &ProxySettings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if settings.timeout_secs == 0 {
        errors.push(ValidationError::Zero("proxy.timeout_secs"));
    }
    if settings.max_response_bytes == 0 {
        errors.push(ValidationError::Zero("proxy.max_response_bytes"));
    }
    if settings.max_request_bytes == 0 {
        errors.push(ValidationError::Zero("proxy.max_request_bytes"));
    }
    if !settings.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(settings.path.clone()));
    }
    if HeaderValue::from_str(&settings.user_agent).is_err() {
        errors.push(ValidationError::InvalidUserAgent);
    }
    errors
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
