//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::mpsc;
use txt_redirect::config::{parse_config, RedirectConfig};
use txt_redirect::{RedirectServer, Shutdown};

/// A server running in the background.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<RedirectConfig>,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

/// Start the redirect server on `addr` with the given TOML config.
pub async fn start_server(addr: SocketAddr, config: &str) -> RunningServer {
    let (updates, config_updates) = mpsc::unbounded_channel();
    let (shutdown, handle) =
        spawn_server(addr, parse_config(config).unwrap(), config_updates).await;

    RunningServer {
        addr,
        shutdown,
        updates,
        handle,
    }
}

/// Start the redirect server fed by an existing update channel.
pub async fn spawn_server(
    addr: SocketAddr,
    mut config: RedirectConfig,
    config_updates: mpsc::UnboundedReceiver<RedirectConfig>,
) -> (
    Shutdown,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
) {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = RedirectServer::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        server.run(listener, config_updates, server_shutdown).await
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (shutdown, handle)
}

/// A client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
