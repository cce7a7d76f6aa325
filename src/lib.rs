//! API playground proxy library.
//!
//! Accepts a description of an HTTP request from a browser-based tester,
//! checks it against a small allow-list policy, performs it server-side and
//! returns a normalized description of the response.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod security;

pub use config::schema::PlaygroundConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{ProxyError, ProxyService, RequestDescriptor, ResponseDescriptor};
