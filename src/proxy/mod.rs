//! Request validation and proxying.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (from the UI)
//!     → validator.rs (URL, scheme, private host, method)
//!     → executor.rs (headers, deadline race, size cap)
//!         → transport.rs (the single outbound call)
//!     → ResponseDescriptor | ProxyError
//! ```
//!
//! `ProxyService::submit` is the one inbound operation. It owns the live
//! settings and walks each request through the `RequestLifecycle` state
//! machine, logging and counting the terminal state exactly once.

pub mod error;
pub mod executor;
pub mod state;
pub mod transport;
pub mod types;
pub mod validator;

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;

use crate::config::ProxySettings;
use crate::observability::metrics;

pub use error::{ProxyError, Rejection};
pub use executor::{Executor, ExecutorLimits, DEFAULT_USER_AGENT};
pub use state::{InvalidTransition, RequestLifecycle, RequestState};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportError, TransportResponse};
pub use types::{
    ErrorKind, ErrorPayload, HeaderEntry, HttpMethod, RequestDescriptor, ResponseDescriptor,
};
pub use validator::{validate, validate_with, ValidatedRequest, ValidationPolicy};

/// Validates and forwards playground requests.
///
/// Requests are independent: the only shared value is the settings snapshot,
/// which is swapped atomically on config reload.
pub struct ProxyService<T> {
    executor: Executor<T>,
    settings: Arc<ArcSwap<ProxySettings>>,
}

impl<T: Transport> ProxyService<T> {
    pub fn new(transport: T, settings: ProxySettings) -> Self {
        Self::with_shared_settings(transport, Arc::new(ArcSwap::from_pointee(settings)))
    }

    /// Build a service that reads settings from a handle shared with a
    /// config watcher.
    pub fn with_shared_settings(transport: T, settings: Arc<ArcSwap<ProxySettings>>) -> Self {
        Self {
            executor: Executor::new(transport),
            settings,
        }
    }

    pub fn settings(&self) -> Arc<ProxySettings> {
        self.settings.load_full()
    }

    pub fn settings_handle(&self) -> Arc<ArcSwap<ProxySettings>> {
        Arc::clone(&self.settings)
    }

    pub fn update_settings(&self, settings: ProxySettings) {
        self.settings.store(Arc::new(settings));
    }

    /// Validate `descriptor` and, if it passes, perform the outbound call.
    pub async fn submit(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ResponseDescriptor, ProxyError> {
        let started = Instant::now();
        let mut lifecycle = RequestLifecycle::new();

        let result = self.run(descriptor, &mut lifecycle).await;
        if let Err(err) = &result {
            if let Err(transition) = lifecycle.fail(err) {
                tracing::error!(error = %transition, "Request finished twice");
            }
        }

        observe(&descriptor.method, &descriptor.url, result.as_ref(), lifecycle.state(), started);
        result
    }

    /// Record a request that was refused before it could be read.
    pub fn refuse(&self, err: ProxyError) -> ProxyError {
        let mut lifecycle = RequestLifecycle::new();
        if let Err(transition) = lifecycle.fail(&err) {
            tracing::error!(error = %transition, "Unexpected refusal state");
        }
        observe("-", "-", Err(&err), lifecycle.state(), Instant::now());
        err
    }

    async fn run(
        &self,
        descriptor: &RequestDescriptor,
        lifecycle: &mut RequestLifecycle,
    ) -> Result<ResponseDescriptor, ProxyError> {
        let settings = self.settings.load_full();

        lifecycle.begin_validation()?;
        let request = validate_with(descriptor, settings.policy())?;

        lifecycle.begin_sending()?;
        let response = self.executor.execute(&request, &settings.limits()).await?;

        lifecycle.succeed(response.status)?;
        Ok(response)
    }
}

/// Log and count a finished request.
fn observe(
    method: &str,
    url: &str,
    result: Result<&ResponseDescriptor, &ProxyError>,
    state: RequestState,
    started: Instant,
) {
    let elapsed = started.elapsed();
    let reached_network = matches!(state, RequestState::Succeeded { .. } | RequestState::Failed { .. });

    match result {
        Ok(response) => {
            tracing::debug!(
                method = %method,
                url = %url,
                status = response.status,
                elapsed_ms = response.response_time_ms,
                "Proxied request succeeded"
            );
            metrics::record_outcome("succeeded", reached_network.then_some(elapsed));
        }
        Err(err) => {
            match err.kind() {
                ErrorKind::Validation => {
                    tracing::info!(method = %method, url = %url, reason = %err, "Request rejected")
                }
                ErrorKind::Timeout | ErrorKind::Network => {
                    tracing::warn!(method = %method, url = %url, kind = %err.kind(), error = %err, "Proxied request failed")
                }
                ErrorKind::Server => {
                    tracing::error!(method = %method, url = %url, error = %err, "Proxied request failed")
                }
            }
            metrics::record_outcome(err.outcome(), reached_network.then_some(elapsed));
        }
    }
}
