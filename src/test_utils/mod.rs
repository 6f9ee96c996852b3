//! In-process mock HTTP servers shared by the unit tests.
//!
//! Each helper binds an ephemeral port, serves a small axum app on a
//! background task, and exposes the recorded traffic for assertions.

use std::net::SocketAddr;

use axum::Router;

pub mod mock_github;
pub mod mock_service;

/// Binds an ephemeral port and serves `app` on a background task.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    addr
}
