//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use host_rewrite_proxy::proxy::{UpstreamClient, UpstreamError};
use host_rewrite_proxy::rewrite::{ProxyRequest, ProxyResponse};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A raw TCP backend answering every connection with the same bytes.
#[allow(dead_code)]
pub struct MockBackend {
    pub addr: SocketAddr,
    /// Request heads (and any body) as received, lossily decoded.
    pub requests: mpsc::UnboundedReceiver<String>,
}

/// Build an HTTP/1.1 response with `Content-Length` and `Connection: close`.
#[allow(dead_code)]
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", body.len()));

    let mut out = head.into_bytes();
    out.extend_from_slice(body);
    out
}

/// Read one request head plus a `Content-Length` body.
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return buf,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return buf;
            }
        }
    }
}

/// Start a mock backend on an ephemeral port.
#[allow(dead_code)]
pub async fn start_mock_backend(response: Vec<u8>) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, requests) = mpsc::unbounded_channel();
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    let response = response.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Upstream that records requests and answers with a canned response.
#[allow(dead_code)]
pub struct RecordingUpstream {
    seen: Arc<Mutex<Vec<ProxyRequest>>>,
    reply: Option<ProxyResponse>,
}

#[allow(dead_code)]
impl RecordingUpstream {
    pub fn replying(reply: ProxyResponse) -> (Self, Arc<Mutex<Vec<ProxyRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (Self { seen: seen.clone(), reply: Some(reply) }, seen)
    }

    pub fn failing() -> (Self, Arc<Mutex<Vec<ProxyRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (Self { seen: seen.clone(), reply: None }, seen)
    }

    pub fn ok(body: &str) -> (Self, Arc<Mutex<Vec<ProxyRequest>>>) {
        Self::replying(ProxyResponse::new(StatusCode::OK, HeaderMap::new(), body.to_string()))
    }
}

impl UpstreamClient for RecordingUpstream {
    async fn send(&self, req: ProxyRequest) -> Result<ProxyResponse, UpstreamError> {
        self.seen.lock().unwrap().push(req);
        match &self.reply {
            Some(resp) => Ok(resp.clone()),
            None => Err(UpstreamError::Connect("connection refused".into())),
        }
    }
}
