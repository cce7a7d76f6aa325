//! Error types for proxied requests.
//!
//! Every failure maps onto one of four kinds (`validation`, `timeout`,
//! `network`, `server`). The `Display` text of each variant is the message
//! shown to the user, so it must stay stable.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use crate::proxy::types::{ErrorKind, ErrorPayload};
use crate::security::format_limit;

/// Why the validator refused a request. First failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedScheme,

    #[error("Requests to private/local addresses are not allowed")]
    PrivateAddress,

    #[error("Invalid HTTP method")]
    InvalidMethod,
}

/// Terminal failure of a proxied request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// Refused before any network activity.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The inbound body could not be read as a request descriptor.
    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    /// The inbound body was over the request cap.
    #[error("Request body too large (max {0} bytes)")]
    RequestTooLarge(usize),

    /// The outbound call did not finish in time.
    #[error("Request timeout ({} seconds)", .0.as_secs())]
    Timeout(Duration),

    /// DNS, connect, TLS or other transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream body was over the response cap.
    #[error("Response too large (max {})", limit_label(.0))]
    ResponseTooLarge(usize),

    /// Anything not anticipated above.
    #[error("Server error: {0}")]
    Server(String),
}

fn limit_label(bytes: &usize) -> String {
    format_limit(*bytes)
}

impl ProxyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::Rejected(_)
            | ProxyError::MalformedRequest(_)
            | ProxyError::RequestTooLarge(_) => ErrorKind::Validation,
            ProxyError::Timeout(_) => ErrorKind::Timeout,
            ProxyError::Network(_) => ErrorKind::Network,
            ProxyError::ResponseTooLarge(_) | ProxyError::Server(_) => ErrorKind::Server,
        }
    }

    /// HTTP status the proxy endpoint answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Rejected(_) | ProxyError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::RequestTooLarge(_) | ProxyError::ResponseTooLarge(_) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ProxyError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ProxyError::Network(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::Rejected(_)
            | ProxyError::MalformedRequest(_)
            | ProxyError::RequestTooLarge(_) => "rejected",
            ProxyError::Timeout(_) => "timed_out",
            ProxyError::Network(_) => "network_failed",
            ProxyError::ResponseTooLarge(_) => "too_large",
            ProxyError::Server(_) => "server_error",
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            message: self.to_string(),
            kind: self.kind(),
        }
    }
}

impl From<ProxyError> for ErrorPayload {
    fn from(err: ProxyError) -> Self {
        err.payload()
    }
}
