//! Async client for the playground proxy endpoint.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One header row; disabled rows are carried but not sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: String,
    pub headers: Vec<HeaderEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry {
            key: key.into(),
            value: value.into(),
            enabled: true,
        });
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescriptor {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
}

/// Error body returned by the proxy on any non-200 status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The proxy answered with its `{ message, type }` error body.
    #[error("{} error ({status}): {}", .body.kind, .body.message)]
    Proxy { status: u16, body: ProxyErrorBody },

    /// The proxy could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The proxy answered with something that is not part of the contract.
    #[error("unexpected response ({status}): {detail}")]
    Decode { status: u16, detail: String },
}

impl ClientError {
    /// The error `type` reported by the proxy, if it reported one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Proxy { body, .. } => Some(&body.kind),
            _ => None,
        }
    }
}

pub struct PlaygroundClient {
    client: Client,
    endpoint: String,
}

impl PlaygroundClient {
    /// `base_url` is the proxy origin, e.g. `http://localhost:3001`.
    pub fn new(base_url: &str) -> Self {
        Self::with_path(base_url, "/api/proxy")
    }

    pub fn with_path(base_url: &str, path: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the proxy to perform `request` and return what the target answered.
    pub async fn send(&self, request: &RequestDescriptor) -> Result<ResponseDescriptor, ClientError> {
        let resp = self.client.post(&self.endpoint).json(request).send().await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;

        if status == 200 {
            return serde_json::from_str(&text).map_err(|e| ClientError::Decode {
                status,
                detail: e.to_string(),
            });
        }

        match serde_json::from_str::<ProxyErrorBody>(&text) {
            Ok(body) => Err(ClientError::Proxy { status, body }),
            Err(_) => Err(ClientError::Decode { status, detail: text }),
        }
    }
}
