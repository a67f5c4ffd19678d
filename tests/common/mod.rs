//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cachelb::config::{BackendConfig, ProxyConfig};
use cachelb::lifecycle::Shutdown;
use cachelb::net::Listener;
use cachelb::proxy::Proxy;
use cachelb::ProxyServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A mock backend that answers every connection with a fixed reply.
pub struct MockBackend {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Number of connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a backend that reads one request, writes `response` and closes.
pub async fn start_mock_backend(response: &'static [u8]) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockBackend { addr, connections }
}

/// Start a backend that writes `first`, waits, writes `second`, then closes.
pub async fn start_split_backend(first: &'static [u8], second: &'static [u8]) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(first).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(100)).await;
                let _ = socket.write_all(second).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockBackend { addr, connections }
}

/// Start a backend that accepts and reads but never replies or closes.
pub async fn start_stalled_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            held.push(socket);
        }
    });

    MockBackend { addr, connections }
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Base config listening on an ephemeral loopback port.
pub fn test_config(backends: &[SocketAddr]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backends = backends
        .iter()
        .map(|addr| BackendConfig::new(addr.to_string()))
        .collect();
    config.lifecycle.drain_timeout_secs = 1;
    config
}

/// A running load balancer.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub proxy: Arc<Proxy>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestProxy {
    /// Trigger shutdown and wait for the server to return.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    let config = config.validated().unwrap();
    let server = ProxyServer::new(config).unwrap();
    let listener = Listener::bind(&server.config().listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let proxy = server.proxy().clone();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, rx));

    TestProxy {
        addr,
        proxy,
        shutdown,
        handle,
    }
}

/// Send `request` as one write and read until the proxy closes.
pub async fn roundtrip(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("proxy did not close the connection")
        .unwrap_or_default();
    response
}

/// Poll until `key` is cached; the cache is populated after the client is released.
pub async fn wait_cached(proxy: &Proxy, key: &[u8]) -> bool {
    let Some(cache) = proxy.cache() else {
        return false;
    };
    for _ in 0..100 {
        if cache.lookup(key).is_some() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
