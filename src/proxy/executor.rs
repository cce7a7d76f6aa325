//! Proxy executor: one outbound call per validated request.
//!
//! # Responsibilities
//! - Build the outbound header set (filtered rows + default User-Agent)
//! - Race the call against the deadline
//! - Map transport failures, timeouts and oversized bodies to `ProxyError`
//! - Shape the upstream response into a `ResponseDescriptor`
//!
//! # Design Decisions
//! - The response time runs until the headers arrive; the deadline also
//!   covers the body download
//! - The size cap applies to the buffered body in bytes
//! - No retries; every outcome is reported exactly once

use std::time::Duration;

use crate::proxy::error::ProxyError;
use crate::proxy::transport::{OutboundRequest, Transport};
use crate::proxy::types::ResponseDescriptor;
use crate::proxy::validator::ValidatedRequest;
use crate::resilience::{with_deadline, DEFAULT_REQUEST_TIMEOUT};
use crate::security::{
    build_outbound_headers, collect_response_headers, exceeds_limit, DEFAULT_MAX_RESPONSE_BYTES,
};

/// User-Agent sent when the user did not set one.
pub const DEFAULT_USER_AGENT: &str = "API-Response-Playground/1.0";

/// Per-call limits applied by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorLimits {
    pub timeout: Duration,
    pub max_response_bytes: usize,
    pub user_agent: String,
}

impl Default for ExecutorLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Sends validated requests through a [`Transport`].
#[derive(Debug, Clone)]
pub struct Executor<T> {
    transport: T,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform the outbound call and classify the outcome.
    ///
    /// A header row the HTTP stack cannot encode fails the request as a
    /// `server` error before anything is sent, not as a `network` error.
    pub async fn execute(
        &self,
        request: &ValidatedRequest,
        limits: &ExecutorLimits,
    ) -> Result<ResponseDescriptor, ProxyError> {
        let headers = build_outbound_headers(&request.headers, &limits.user_agent)
            .map_err(|e| ProxyError::Server(e.to_string()))?;

        let outbound = OutboundRequest {
            method: request.method,
            url: request.url.clone(),
            headers,
            body: request.body.clone().filter(|_| request.method.carries_body()),
        };

        let response = with_deadline(limits.timeout, self.transport.send(outbound))
            .await
            .map_err(|_| ProxyError::Timeout(limits.timeout))?
            .map_err(|e| ProxyError::Network(e.to_string()))?;
        let response_time_ms =
            u64::try_from(response.headers_elapsed.as_millis()).unwrap_or(u64::MAX);

        if exceeds_limit(response.body.len(), limits.max_response_bytes) {
            tracing::debug!(
                url = %request.url,
                size = response.body.len(),
                limit = limits.max_response_bytes,
                "Discarding oversized response"
            );
            return Err(ProxyError::ResponseTooLarge(limits.max_response_bytes));
        }

        Ok(ResponseDescriptor {
            status: response.status,
            status_text: response.status_text,
            headers: collect_response_headers(response.headers),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            response_time_ms,
        })
    }
}
