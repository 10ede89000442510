//! `edgeport health`: probe `GET /health` on a running instance.

use std::time::Duration;

use axum::body::Body;
use bytes::Bytes;
use http_body_util::BodyExt;

use crate::cli::HealthArgs;
use crate::error::EdgeError;
use crate::health::HealthResponse;
use crate::server::build_http_client;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

fn request_failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> EdgeError {
    EdgeError::HttpRequest {
        source: source.into(),
    }
}

async fn fetch(base: &str) -> Result<Bytes, EdgeError> {
    let uri: hyper::Uri = format!("{}/health", base.trim_end_matches('/'))
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| EdgeError::UriParse {
            source: Box::new(e),
        })?;

    let request = hyper::Request::get(uri)
        .body(Body::empty())
        .map_err(request_failed)?;

    let response = tokio::time::timeout(PROBE_TIMEOUT, build_http_client().request(request))
        .await
        .map_err(|_| request_failed(format!("no response within {}s", PROBE_TIMEOUT.as_secs())))?
        .map_err(request_failed)?;

    let status = response.status();
    if !status.is_success() {
        return Err(EdgeError::HealthCheckFailed(status));
    }
    Ok(response
        .into_body()
        .collect()
        .await
        .map_err(request_failed)?
        .to_bytes())
}

pub async fn execute(args: HealthArgs) -> Result<(), EdgeError> {
    let body = fetch(&args.url).await?;
    let text = String::from_utf8_lossy(&body);

    if args.json {
        println!("{text}");
        return Ok(());
    }

    match serde_json::from_str::<HealthResponse>(&text) {
        Ok(health) => print!("{}", render(&args.url, &health)),
        Err(e) => {
            eprintln!("Unrecognized health payload: {e}");
            println!("{text}");
        }
    }
    Ok(())
}

fn render(url: &str, health: &HealthResponse) -> String {
    let source = if health.config.file_loaded {
        "loaded"
    } else {
        "default-or-env"
    };
    let proxy = if health.config.proxy_enabled {
        format!("{} route(s)", health.config.routes)
    } else {
        "disabled".to_string()
    };

    format!(
        "\u{2713} edgeport {} at {url} is {}\n  up {}\n  config {} ({source})\n  proxy {proxy}\n  {} forwarded / {} failed\n",
        health.version,
        health.status,
        format_uptime(health.uptime_seconds),
        health.config.path,
        health.stats.requests_forwarded,
        health.stats.requests_failed,
    )
}

fn format_uptime(seconds: u64) -> String {
    match (seconds / 3600, seconds % 3600 / 60, seconds % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, s) => format!("{h}h {m}m {s}s"),
    }
}
