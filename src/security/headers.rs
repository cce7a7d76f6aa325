//! Header handling on both sides of the proxy.
//!
//! # Responsibilities
//! - Filter the user's header rows down to the ones actually sent
//! - Add a default `User-Agent` when the user did not supply one
//! - Collapse upstream response headers into a lowercased name → value map
//!
//! Names are case-insensitive on both sides; on a collision the last value
//! wins.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use thiserror::Error;

use crate::proxy::HeaderEntry;

/// Header the user supplied that cannot be put on the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("invalid header name {0:?}")]
    InvalidName(String),

    #[error("invalid value for header {0:?}")]
    InvalidValue(String),
}

/// Build the outbound header set from the user's rows.
///
/// Disabled rows and rows with an empty key or value are skipped. A later row
/// replaces an earlier one with the same (case-insensitive) name.
pub fn build_outbound_headers(
    entries: &[HeaderEntry],
    default_user_agent: &str,
) -> Result<HeaderMap, HeaderError> {
    let mut headers = HeaderMap::new();

    for entry in entries.iter().filter(|e| e.is_active()) {
        let name = HeaderName::from_bytes(entry.key.as_bytes())
            .map_err(|_| HeaderError::InvalidName(entry.key.clone()))?;
        let value = HeaderValue::from_str(&entry.value)
            .map_err(|_| HeaderError::InvalidValue(entry.key.clone()))?;
        headers.insert(name, value);
    }

    if !headers.contains_key(USER_AGENT) {
        let value = HeaderValue::from_str(default_user_agent)
            .map_err(|_| HeaderError::InvalidValue(USER_AGENT.to_string()))?;
        headers.insert(USER_AGENT, value);
    }

    Ok(headers)
}

/// Collapse response headers into a map keyed by lowercased name.
///
/// Input order matters: for a repeated name the last pair wins.
pub fn collect_response_headers<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut collected = BTreeMap::new();
    for (name, value) in pairs {
        collected.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }
    collected
}
