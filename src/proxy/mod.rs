//! Fallback handler: reverse proxy or static files.
//!
//! [`fallback_handler`] receives every request not claimed by `/health`
//! or the auth routes. When the proxy is enabled and a route prefix
//! covers the path ([`routing`]), the request is forwarded to that
//! route's upstream with rewritten headers ([`headers`]). Anything else
//! is served from the frontend root.
//!
//! `http` routes buffer the request body and collect the whole upstream
//! response under the upstream timeout. `raw` routes stream both bodies
//! through; only the wait for the response head is timed.

pub mod headers;
pub mod routing;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::config::model::{ProxyMode, ProxyRouteConfig};
use crate::error::ProxyError;
use crate::server::{AppState, HttpClient};

pub async fn fallback_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    let config = &state.config.config;
    if config.proxy_enabled {
        let matched = routing::match_route(&config.proxy_routes, request.uri().path())
            .map(|(idx, path)| (idx, path.to_string()));
        if let Some((idx, upstream_path)) = matched {
            let route = &config.proxy_routes[idx];
            return forward(&state, route, &upstream_path, addr, request).await;
        }
    }
    serve_static(&state, request).await
}

async fn serve_static(state: &AppState, request: Request) -> Response {
    match state.static_files.clone().oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn upstream_uri(route: &ProxyRouteConfig, path: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
    let raw = match query {
        Some(q) => format!("http://{}{path}?{q}", route.upstream_authority()),
        None => format!("http://{}{path}", route.upstream_authority()),
    };
    raw.parse().map_err(|_| ProxyError::InvalidUri(raw))
}

async fn forward(
    state: &AppState,
    route: &ProxyRouteConfig,
    upstream_path: &str,
    addr: SocketAddr,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let correlation_id = headers::correlation_id(&parts.headers);
    let upstream = route.upstream_authority();
    let start = Instant::now();

    tracing::info!(
        correlation_id = %correlation_id,
        method = %parts.method,
        path = %parts.uri.path(),
        prefix = %route.route_prefix,
        upstream = %upstream,
        mode = %route.mode,
        "forwarding request"
    );

    let outbound_headers = headers::build_forwarded_headers(
        &parts.headers,
        &addr.ip().to_string(),
        &upstream,
        &correlation_id,
    );

    let result = match upstream_uri(route, upstream_path, parts.uri.query()) {
        Ok(uri) => {
            let outbound = Outbound {
                client: &state.http_client,
                method: parts.method,
                uri,
                headers: outbound_headers,
                timeout: state.upstream_timeout,
            };
            match route.mode {
                ProxyMode::Http => outbound.buffered(body).await,
                ProxyMode::Raw => outbound.streaming(body).await,
            }
        }
        Err(e) => Err(e),
    };

    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut response = match result {
        Ok(response) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                correlation_id = %correlation_id,
                upstream = %upstream,
                status = response.status().as_u16(),
                latency_ms,
                "upstream responded"
            );
            response
        }
        Err(e) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                correlation_id = %correlation_id,
                upstream = %upstream,
                error = %e,
                latency_ms,
                "upstream request failed"
            );
            e.status().into_response()
        }
    };

    if let Ok(val) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(headers::CORRELATION_ID, val);
    }
    response
}

struct Outbound<'a> {
    client: &'a HttpClient,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    timeout: Duration,
}

impl Outbound<'_> {
    fn request(&self, body: Body) -> axum::http::Request<Body> {
        let mut request = axum::http::Request::new(body);
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = self.uri.clone();
        *request.headers_mut() = self.headers.clone();
        request
    }

    async fn buffered(self, body: Body) -> Result<Response, ProxyError> {
        let bytes = body
            .collect()
            .await
            .map_err(ProxyError::RequestBody)?
            .to_bytes();
        let request = self.request(Body::from(bytes));

        let exchange = async {
            let response = self.client.request(request).await?;
            let (parts, incoming) = response.into_parts();
            let collected = incoming.collect().await?.to_bytes();
            Ok::<_, ProxyError>((parts, collected))
        };

        let (mut parts, collected) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProxyError::Timeout(self.timeout))??;

        headers::strip_response_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::from(collected)))
    }

    async fn streaming(self, body: Body) -> Result<Response, ProxyError> {
        let request = self.request(body);
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ProxyError::Timeout(self.timeout))??;

        let (mut parts, incoming) = response.into_parts();
        headers::strip_streamed_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(incoming)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_uri_keeps_query() {
        let route = ProxyRouteConfig::default();
        assert_eq!(
            upstream_uri(&route, "/users", Some("page=2")).unwrap().to_string(),
            "http://127.0.0.1:8080/users?page=2"
        );
        assert_eq!(
            upstream_uri(&route, "/", None).unwrap().to_string(),
            "http://127.0.0.1:8080/"
        );
    }

    #[test]
    fn upstream_uri_rejects_bad_host() {
        let route = ProxyRouteConfig {
            upstream_host: "bad host".into(),
            ..ProxyRouteConfig::default()
        };
        assert!(matches!(
            upstream_uri(&route, "/", None),
            Err(ProxyError::InvalidUri(_))
        ));
    }
}
