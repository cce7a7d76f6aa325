//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy, preflight and health handlers
//! - Wire up middleware (tracing, request ID, CORS headers, panics, body limit)
//! - Bind server to listener
//! - Apply reloaded `[proxy]` settings while running
//! - Stop on the shutdown signal

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::config::{validate_proxy_settings, PlaygroundConfig, ProxySettings};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::{method_not_allowed, panic_response};
use crate::proxy::{ProxyError, ProxyService, RequestDescriptor, ReqwestTransport};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProxyService<ReqwestTransport>>,
    pub max_request_bytes: usize,
}

/// HTTP server for the playground proxy.
pub struct HttpServer {
    router: Router,
    config: PlaygroundConfig,
    service: Arc<ProxyService<ReqwestTransport>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: PlaygroundConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a server that sends outbound calls through `client`.
    pub fn with_client(config: PlaygroundConfig, client: reqwest::Client) -> Self {
        let service = Arc::new(ProxyService::new(
            ReqwestTransport::new(client),
            config.proxy.clone(),
        ));
        let state = AppState {
            service: Arc::clone(&service),
            max_request_bytes: config.proxy.max_request_bytes,
        };
        let router = Self::build_router(&config.proxy, state);
        Self {
            router,
            config,
            service,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(settings: &ProxySettings, state: AppState) -> Router {
        Router::new()
            .route(
                &settings.path,
                post(proxy_handler)
                    .options(preflight_handler)
                    .fallback(method_not_allowed_handler),
            )
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(settings.max_request_bytes))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.headers().request_id(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs arriving on `config_updates` replace the live `[proxy]`
    /// settings. The server drains and returns once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<PlaygroundConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.proxy.path,
            "HTTP server starting"
        );

        let reloader = tokio::spawn(apply_config_updates(
            Arc::clone(&self.service),
            self.config.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }
}

/// Swap in each reloaded `[proxy]` section that passes validation.
async fn apply_config_updates(
    service: Arc<ProxyService<ReqwestTransport>>,
    mut current: PlaygroundConfig,
    mut updates: mpsc::UnboundedReceiver<PlaygroundConfig>,
) {
    while let Some(next) = updates.recv().await {
        if let Err(errors) = validate_proxy_settings(&next.proxy) {
            tracing::error!(errors = ?errors, "Ignoring invalid reloaded proxy settings");
            continue;
        }
        if next.listener != current.listener || next.observability != current.observability {
            tracing::warn!("Listener and observability changes take effect after a restart");
        }
        if next.proxy.path != current.proxy.path
            || next.proxy.max_request_bytes != current.proxy.max_request_bytes
        {
            tracing::warn!("proxy.path and proxy.max_request_bytes take effect after a restart");
        }

        service.update_settings(next.proxy.clone());
        tracing::info!(
            timeout_secs = next.proxy.timeout_secs,
            max_response_bytes = next.proxy.max_response_bytes,
            allow_private_addresses = next.proxy.allow_private_addresses,
            "Proxy settings reloaded"
        );
        current = next;
    }
}

/// Main proxy handler.
/// Reads the request descriptor, validates it and performs the outbound call.
async fn proxy_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ProxyError::RequestTooLarge(state.max_request_bytes)
            } else {
                ProxyError::MalformedRequest(rejection.body_text())
            };
            return state.service.refuse(err).into_response();
        }
    };

    let descriptor: RequestDescriptor = match serde_json::from_slice(&bytes) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            return state
                .service
                .refuse(ProxyError::MalformedRequest(e.to_string()))
                .into_response();
        }
    };

    match state.service.submit(&descriptor).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// CORS preflight: empty 200, headers come from the middleware.
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed_handler() -> Response {
    method_not_allowed()
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

async fn health_handler() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Method;
    use tower::ServiceExt;

    fn app() -> Router {
        HttpServer::new(PlaygroundConfig::default()).router()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/proxy")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn preflight_is_empty_ok() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/proxy")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn other_methods_get_405() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/api/proxy")
                .body(Body::empty())
                .unwrap();
            let response = app().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_cors(&response);
            let json = json_body(response).await;
            assert_eq!(json["message"], "Method not allowed");
            assert_eq!(json["type"], "validation");
        }
    }

    #[tokio::test]
    async fn validation_failure_is_400() {
        let response = app()
            .oneshot(post_json(r#"{"url":"http://localhost/","method":"GET","headers":[]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Requests to private/local addresses are not allowed");
        assert_eq!(json["type"], "validation");
    }

    #[tokio::test]
    async fn invalid_method_is_400() {
        let response = app()
            .oneshot(post_json(r#"{"url":"https://example.com/","method":"PATCH","headers":[]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Invalid HTTP method");
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let response = app().oneshot(post_json("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["type"], "validation");
        assert!(json["message"].as_str().unwrap().starts_with("Invalid request body: "));
    }

    #[tokio::test]
    async fn oversized_request_body_is_413() {
        let mut config = PlaygroundConfig::default();
        config.proxy.max_request_bytes = 64;
        let app = HttpServer::new(config).router();

        let body = format!(r#"{{"url":"https://example.com/","method":"POST","body":"{}"}}"#, "x".repeat(200));
        let response = app.oneshot(post_json(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert_eq!(json["message"], "Request body too large (max 64 bytes)");
        assert_eq!(json["type"], "validation");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = app().oneshot(post_json("{}")).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let mut request = post_json("{}");
        request
            .headers_mut()
            .insert("x-request-id", HeaderValue::from_static("trace-42"));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "trace-42");
    }

    #[tokio::test]
    async fn health_reports_version() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let json = json_body(response).await;
        assert_eq!(json["status"], "operational");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn custom_path_is_honoured() {
        let mut config = PlaygroundConfig::default();
        config.proxy.path = "/proxy".into();
        let app = HttpServer::new(config).router();

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/proxy")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::OK);
    }
}
