//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ingress_router::config::{ListenerConfig, TimeoutConfig};
use ingress_router::{Ingress, IngressError, IngressServer, Listeners, RuleEntry, Shutdown, Snapshot};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running ingress on ephemeral loopback ports.
pub struct Harness {
    pub ingress: Arc<Ingress>,
    pub shutdown: Shutdown,
    pub plain: SocketAddr,
    pub tls: SocketAddr,
    pub task: JoinHandle<Result<(), IngressError>>,
}

impl Harness {
    /// Client that resolves every name in `hosts` to loopback. The URL
    /// port selects the listener.
    pub fn client(&self, hosts: &[&str]) -> reqwest::Client {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .danger_accept_invalid_certs(true)
            .tls_info(true);
        for host in hosts {
            builder = builder.resolve(host, self.plain);
        }
        builder.build().unwrap()
    }

    pub fn http_url(&self, host: &str, path: &str) -> String {
        format!("http://{}:{}{}", host, self.plain.port(), path)
    }

    pub fn https_url(&self, host: &str, path: &str) -> String {
        format!("https://{}:{}{}", host, self.tls.port(), path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("ingress did not stop in time")
            .expect("ingress task panicked");
        assert!(result.is_ok(), "ingress stopped with {:?}", result);
    }
}

pub async fn start_ingress() -> Harness {
    let listener = ListenerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        tls_port: 0,
    };
    let timeouts = TimeoutConfig {
        connect_secs: 1,
        request_secs: 2,
        shutdown_grace_secs: 1,
    };

    let listeners = Listeners::bind(&listener).await.unwrap();
    let plain = listeners.plain_addr();
    let tls = listeners.tls_addr();

    let ingress = Arc::new(Ingress::new());
    let shutdown = Shutdown::new();
    let server = IngressServer::new(ingress.clone(), &timeouts);
    let task = tokio::spawn(server.serve(listeners, shutdown.clone()));

    Harness {
        ingress,
        shutdown,
        plain,
        tls,
        task,
    }
}

pub fn rules(entries: &[(&str, &str, String)]) -> Snapshot {
    Snapshot::new(
        entries
            .iter()
            .map(|(host, path, backend)| RuleEntry::new(*host, *path, backend.as_str()))
            .collect(),
        Vec::new(),
    )
}

/// Start a mock backend answering `"<name> <path> <host>"`.
pub async fn start_mock_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let head = match read_head(&mut socket).await {
                            Some(head) => head,
                            None => return,
                        };
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("")
                            .to_string();
                        let host = head
                            .lines()
                            .filter_map(|line| line.split_once(':'))
                            .find(|(name, _)| name.eq_ignore_ascii_case("host"))
                            .map(|(_, value)| value.trim().to_string())
                            .unwrap_or_default();

                        let body = format!("{} {} {}", name, path, host);
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn dead_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).ok()
}
