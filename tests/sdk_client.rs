//! The Rust SDK against a live proxy.

use sdk_rust::{ClientError, PlaygroundClient, RequestDescriptor};

mod common;
use common::{closed_port, local_config, start_proxy, start_stub_backend, StubResponse};

#[tokio::test]
async fn send_returns_the_upstream_response() {
    let backend = start_stub_backend(
        StubResponse::ok("[1,2,3]").header("Content-Type", "application/json"),
    )
    .await;
    let proxy = start_proxy(local_config()).await;
    let client = PlaygroundClient::new(&proxy.base_url());

    let response = client
        .send(&RequestDescriptor::new("PUT", backend.url("/list")).body("[1,2,3]"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.body, "[1,2,3]");
    assert_eq!(response.headers["content-type"], "application/json");
    assert!(backend.last_request().await.starts_with("PUT /list HTTP/1.1"));
}

#[tokio::test]
async fn proxy_errors_are_typed() {
    let proxy = start_proxy(local_config()).await;
    let client = PlaygroundClient::new(&proxy.base_url());

    let err = client
        .send(&RequestDescriptor::new("GET", "gopher://example.com/"))
        .await
        .unwrap_err();
    match err {
        ClientError::Proxy { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body.kind, "validation");
            assert_eq!(body.message, "Only HTTP and HTTPS protocols are allowed");
        }
        other => panic!("expected proxy error, got {other:?}"),
    }

    let addr = closed_port().await;
    let err = client
        .send(&RequestDescriptor::new("GET", format!("http://{addr}/")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some("network"));
}

#[tokio::test]
async fn unreachable_proxy_is_a_transport_error() {
    let addr = closed_port().await;
    let client = PlaygroundClient::new(&format!("http://{addr}"));

    let err = client
        .send(&RequestDescriptor::new("GET", "https://example.com/"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
