//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use playground_proxy::config::PlaygroundConfig;
use playground_proxy::http::HttpServer;
use playground_proxy::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// What the stub backend answers with.
#[derive(Clone)]
pub struct StubResponse {
    pub status_line: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    pub delay: Duration,
    /// Pause after the headers and the first two body bytes.
    pub body_delay: Duration,
}

impl StubResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_line: "200 OK",
            headers: Vec::new(),
            body: body.into(),
            delay: Duration::ZERO,
            body_delay: Duration::ZERO,
        }
    }

    pub fn status(mut self, status_line: &'static str) -> Self {
        self.status_line = status_line;
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn body_delay(mut self, delay: Duration) -> Self {
        self.body_delay = delay;
        self
    }
}

/// A raw-TCP backend on an ephemeral port.
pub struct StubBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last_request: Arc<tokio::sync::Mutex<String>>,
}

impl StubBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw text of the last request head and body received.
    pub async fn last_request(&self) -> String {
        self.last_request.lock().await.clone()
    }
}

/// Start a backend that answers every connection with `response`.
pub async fn start_stub_backend(response: StubResponse) -> StubBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let last_request = Arc::new(tokio::sync::Mutex::new(String::new()));

    let (h, l) = (hits.clone(), last_request.clone());
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let response = response.clone();
            let (h, l) = (h.clone(), l.clone());
            tokio::spawn(async move {
                h.fetch_add(1, Ordering::SeqCst);
                serve_one(socket, response, l).await;
            });
        }
    });

    StubBackend {
        addr,
        hits,
        last_request,
    }
}

async fn serve_one(
    mut socket: TcpStream,
    response: StubResponse,
    last_request: Arc<tokio::sync::Mutex<String>>,
) {
    let request = read_request(&mut socket).await;
    *last_request.lock().await = request;

    tokio::time::sleep(response.delay).await;

    let mut head = format!("HTTP/1.1 {}\r\n", response.status_line);
    for (name, value) in &response.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.body.len()
    ));

    let split = response.body.len().min(2);
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&response.body[..split]).await;
    let _ = socket.flush().await;
    tokio::time::sleep(response.body_delay).await;
    let _ = socket.write_all(&response.body[split..]).await;
    let _ = socket.shutdown().await;
}

/// Read the request head and, if announced, its body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// A port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A running proxy on an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub config_updates: mpsc::UnboundedSender<PlaygroundConfig>,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/api/proxy", self.addr)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config that lets the proxy reach stubs on 127.0.0.1.
pub fn local_config() -> PlaygroundConfig {
    let mut config = PlaygroundConfig::default();
    config.proxy.allow_private_addresses = true;
    config
}

pub async fn start_proxy(config: PlaygroundConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    TestProxy {
        addr,
        config_updates,
        shutdown,
    }
}
