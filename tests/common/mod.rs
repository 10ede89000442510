//! Shared helpers for integration tests: temp dirs, the edge server, and
//! mock upstreams, all bound to `127.0.0.1:0`.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use edgeport::config::model::{AppConfig, LoadedAppConfig};
use edgeport::server::{self, AppState};

pub const MAX_BODY: usize = 1_048_576;

pub use tempfile::TempDir;

pub fn temp_dir() -> TempDir {
    tempfile::Builder::new().prefix("edgeport-").tempdir().unwrap()
}

/// Write `contents` to `name` under `dir`, creating parent directories.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub async fn start_server(config: AppConfig) -> TestServer {
    start_server_with_timeout(config, Duration::from_secs(5)).await
}

pub async fn start_server_with_timeout(config: AppConfig, timeout: Duration) -> TestServer {
    let loaded = LoadedAppConfig {
        config,
        config_path: "/nonexistent/static-server.conf".into(),
        file_config_loaded: false,
        warnings: Vec::new(),
    };
    let state = Arc::new(AppState::new(loaded, timeout));
    let router = server::build_router(Arc::clone(&state), MAX_BODY);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    TestServer {
        addr,
        state,
        shutdown: Some(shutdown_tx),
    }
}

/// Serve `router` as a mock upstream and return its address.
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Config with the proxy and auth off, serving `frontend_root`.
pub fn static_only(frontend_root: PathBuf) -> AppConfig {
    let mut config = AppConfig {
        frontend_root,
        proxy_enabled: false,
        proxy_routes: Vec::new(),
        ..AppConfig::default()
    };
    config.auth.enabled = false;
    config
}
