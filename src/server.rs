//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the resolved
//! config, auth store, upstream client, static file service, stats, and
//! uptime), [`build_router`] for constructing the Axum router with
//! middleware layers, [`build_http_client`] for the connection-pooled
//! hyper client, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::routing::get;
use axum::Router;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AuthStore};
use crate::config::model::LoadedAppConfig;
use crate::health::health_handler;
use crate::proxy;

#[derive(Debug)]
pub struct Stats {
    pub forwarded: AtomicU64,
    pub failed: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

pub type HttpClient = Client<HttpConnector, Body>;

pub struct AppState {
    /// Resolved once at startup and never mutated.
    pub config: Arc<LoadedAppConfig>,
    pub auth: AuthStore,
    pub http_client: HttpClient,
    pub static_files: ServeDir,
    pub upstream_timeout: Duration,
    pub start_time: Instant,
    pub stats: Stats,
}

impl AppState {
    #[must_use]
    pub fn new(config: LoadedAppConfig, upstream_timeout: Duration) -> Self {
        let static_files = ServeDir::new(&config.config.frontend_root);
        Self {
            config: Arc::new(config),
            auth: AuthStore::new(),
            http_client: build_http_client(),
            static_files,
            upstream_timeout,
            start_time: Instant::now(),
            stats: Stats::new(),
        }
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    let mut http = HttpConnector::new();
    http.set_nodelay(true);
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(http)
}

/// `/health`, the auth routes when enabled, and the proxy/static fallback.
pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));

    let auth_config = &state.config.config.auth;
    if auth_config.enabled {
        router = router.merge(auth::handlers::routes(&auth_config.prefix));
    }

    router
        .fallback(proxy::fallback_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

/// Log the mounts that [`build_router`] will serve.
pub fn log_mounts(loaded: &LoadedAppConfig) {
    let config = &loaded.config;

    if config.auth.enabled {
        tracing::info!(
            prefix = %config.auth.prefix,
            shadows = crate::config::validation::shadowed_proxy_prefix(config).unwrap_or("-"),
            "auth endpoints mounted"
        );
    } else {
        tracing::info!("auth endpoints disabled");
    }

    if !config.proxy_enabled {
        tracing::info!("proxy disabled");
    } else if config.proxy_routes.is_empty() {
        tracing::warn!("proxy enabled but no routes configured, proxy mount skipped");
    } else {
        for route in &config.proxy_routes {
            tracing::info!(
                prefix = %route.route_prefix,
                upstream = %route.upstream_authority(),
                mode = %route.mode,
                "proxy mount"
            );
        }
    }

    if config.frontend_root.is_dir() {
        tracing::info!(root = %config.frontend_root.display(), "static files mounted");
    } else {
        tracing::warn!(
            root = %config.frontend_root.display(),
            "frontend root is not a directory, static requests will return 404"
        );
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
