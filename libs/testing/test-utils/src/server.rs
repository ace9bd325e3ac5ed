//! Ephemeral HTTP servers for tests.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// An axum router served on `127.0.0.1:<random port>`.
///
/// The server task is aborted when this value is dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read test listener address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        tracing::debug!(%addr, "Test server listening");
        Self { addr, handle }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url(), path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A loopback URL nothing is listening on.
///
/// The port is reserved by binding and then released, so connection attempts
/// are refused rather than hanging.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read probe listener address");
    drop(listener);
    format!("http://{}", addr)
}
