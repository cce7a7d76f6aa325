//! Outbound HTTP transport.
//!
//! The executor talks to the network only through [`Transport`], which keeps
//! the timeout, size cap and error mapping testable without sockets.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

use crate::proxy::types::HttpMethod;

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    /// Sent unmodified; `None` for GET.
    pub body: Option<String>,
}

/// Raw upstream response with the body fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Reason phrase as sent by the upstream.
    pub status_text: String,
    /// Time until the status line and headers arrived, body excluded.
    pub headers_elapsed: Duration,
    /// Header pairs in the order they arrived, duplicates included.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Failure below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Performs one outbound HTTP exchange.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(describe)?;
        let headers_elapsed = start.elapsed();

        let status = response.status();
        let status_text = reason_phrase(&response);
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(describe)?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text,
            headers_elapsed,
            headers,
            body: body.to_vec(),
        })
    }
}

/// The phrase from the status line. hyper keeps it only when it differs
/// from the standard one for the code.
fn reason_phrase(response: &reqwest::Response) -> String {
    match response.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Flatten a reqwest error and its sources into one line.
fn describe(err: reqwest::Error) -> TransportError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TransportError(message)
}
