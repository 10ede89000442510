//! `edgeport run`: start the edge server.
//!
//! Resolves the layered configuration, initializes logging (console
//! plus the configured log file), logs the resulting mounts, and serves
//! the router until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::{self, env::ProcessEnv};
use crate::error::EdgeError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), EdgeError> {
    let loaded = config::load_app_config_with(&ProcessEnv, args.config.as_deref());

    let log_format = logging::resolve_format(args.pretty, args.json);
    let log_path = loaded.config.log_path();
    let _log_guard = logging::init(
        &args.log_level,
        log_format,
        Some((loaded.config.log_dir.as_path(), loaded.config.log_file.as_str())),
    );

    tracing::info!(
        path = %loaded.config_path.display(),
        state = loaded.load_state(),
        "configuration resolved"
    );
    tracing::info!(path = %log_path.display(), "log file");
    for warning in &loaded.warnings {
        tracing::warn!(
            origin = %warning.origin,
            key = %warning.key,
            suggestion = warning.suggestion.as_deref().unwrap_or(""),
            "{}",
            warning.message
        );
    }
    for warning in config::validation::check(&loaded.config) {
        tracing::warn!(key = %warning.key, "{}", warning.message);
    }
    server::log_mounts(&loaded);

    let addr: SocketAddr = loaded.config.bind_address().parse()?;
    let state = Arc::new(AppState::new(loaded, Duration::from_millis(args.timeout)));
    let router = server::build_router(state, args.max_body);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        timeout_ms = args.timeout,
        max_body = args.max_body,
        "edgeport started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("edgeport stopped");
    Ok(())
}
