//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use memory_gateway::{GatewayConfig, HttpServer};

/// One request as seen by a mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    fn parse(raw: &str) -> Self {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
        let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
        Self {
            method: request_line.next().unwrap_or("").to_string(),
            path: request_line.next().unwrap_or("").to_string(),
            body: body.to_string(),
        }
    }
}

/// Start a mock upstream that records every request it receives and
/// answers each with a fixed status and JSON body.
pub async fn start_recording_upstream(
    addr: SocketAddr,
    status: u16,
    body: &'static str,
) -> mpsc::UnboundedReceiver<RecordedRequest> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        loop {
                            match socket.read(&mut chunk).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    buf.extend_from_slice(&chunk[..n]);
                                    if request_complete(&buf) {
                                        break;
                                    }
                                }
                                Err(_) => break,
                            }
                        }

                        let raw = String::from_utf8_lossy(&buf).to_string();
                        let _ = tx.send(RecordedRequest::parse(&raw));

                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    rx
}

/// Start a mock upstream with a fixed response, discarding requests.
#[allow(dead_code)]
pub async fn start_mock_upstream(addr: SocketAddr, status: u16, body: &'static str) {
    let _ = start_recording_upstream(addr, status, body).await;
}

/// Spawn a gateway bound to `addr`, proxying to `upstream_base`.
pub async fn spawn_gateway(addr: SocketAddr, upstream_base: &str) {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = addr.to_string();
    config.upstream.base_url = upstream_base.to_string();

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
}

/// Build a test client that never reuses pooled connections.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = find_subslice(buf, b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..header_end]);
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    buf.len() >= header_end + 4 + content_length
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}
