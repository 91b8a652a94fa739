//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

use dispatchd::config::DispatchConfig;
use dispatchd::{Dispatcher, HttpServer, Shutdown};

/// Running server handle. Dropping the `Shutdown` stops the server, so keep
/// this alive for the duration of the test.
pub struct TestServer {
    pub addr: SocketAddr,
    pub dispatcher: Arc<Dispatcher>,
    _shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spawn a dispatch server on an ephemeral port.
pub async fn spawn_server(config: DispatchConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let dispatcher = Arc::new(Dispatcher::new(&config));
    let server = HttpServer::new(config, Arc::clone(&dispatcher));

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the acceptor a moment to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        dispatcher,
        _shutdown: shutdown,
    }
}

/// Spawn a backend that answers "/" after the given delay.
pub async fn start_delayed_backend(delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind backend port");
    let addr = listener.local_addr().expect("local addr");

    let app = Router::new().route(
        "/",
        get(move || async move {
            tokio::time::sleep(delay).await;
            "hello from backend"
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// Test client without connection pooling surprises.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .expect("build client")
}
