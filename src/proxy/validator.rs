//! Request validation.
//!
//! Pure function over a `RequestDescriptor`. Checks run in a fixed order and
//! stop at the first failure:
//!
//! 1. the URL parses as an absolute URL
//! 2. its scheme is `http` or `https`
//! 3. its host is not on the private block list (skippable for local dev)
//! 4. the method is one of GET, POST, PUT, DELETE

use url::Url;

use crate::proxy::error::Rejection;
use crate::proxy::types::{HeaderEntry, HttpMethod, RequestDescriptor};
use crate::security::is_private_url;

/// Knobs that change what the validator accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Skip the private address check.
    pub allow_private_addresses: bool,
}

/// A descriptor that passed validation, with its URL and method parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: Vec<HeaderEntry>,
    /// Already dropped for GET.
    pub body: Option<String>,
}

/// Validate with the default policy (private addresses blocked).
pub fn validate(descriptor: &RequestDescriptor) -> Result<ValidatedRequest, Rejection> {
    validate_with(descriptor, ValidationPolicy::default())
}

pub fn validate_with(
    descriptor: &RequestDescriptor,
    policy: ValidationPolicy,
) -> Result<ValidatedRequest, Rejection> {
    if descriptor.url.is_empty() {
        return Err(Rejection::InvalidUrl);
    }
    let url = Url::parse(&descriptor.url).map_err(|_| Rejection::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Rejection::UnsupportedScheme);
    }

    if !policy.allow_private_addresses && is_private_url(&url) {
        return Err(Rejection::PrivateAddress);
    }

    let method: HttpMethod = descriptor
        .method
        .parse()
        .map_err(|_| Rejection::InvalidMethod)?;

    let body = if method.carries_body() {
        descriptor.body.clone()
    } else {
        None
    };

    Ok(ValidatedRequest {
        url,
        method,
        headers: descriptor.headers.clone(),
        body,
    })
}
