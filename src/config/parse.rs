//! Parse-or-default value grammar shared by the file and environment layers.
//!
//! Every function here returns `Option` (or takes a fallback) instead of
//! an error: a malformed value is never fatal, the caller simply keeps
//! whatever it had before.

use super::model::{ProxyMode, ProxyRouteConfig, DEFAULT_UPSTREAM_HOST};

/// Parse a decimal TCP port in `1..=65535`. The whole trimmed string must parse.
#[must_use]
pub fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

/// Parse a boolean switch; unrecognized input keeps `fallback`.
#[must_use]
pub fn parse_bool(raw: &str, fallback: bool) -> bool {
    parse_bool_opt(raw).unwrap_or(fallback)
}

#[must_use]
pub fn parse_bool_opt(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a proxy mode. Empty input means `Http`; unknown input keeps `fallback`.
#[must_use]
pub fn parse_proxy_mode(raw: &str, fallback: ProxyMode) -> ProxyMode {
    parse_proxy_mode_opt(raw).unwrap_or(fallback)
}

#[must_use]
pub fn parse_proxy_mode_opt(raw: &str) -> Option<ProxyMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "raw" => Some(ProxyMode::Raw),
        "http" | "" => Some(ProxyMode::Http),
        _ => None,
    }
}

/// Force a leading `/` and strip trailing slashes unless the prefix is `/`.
#[must_use]
pub fn normalize_route_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Normalize a mount prefix for local handlers.
///
/// Router path syntax characters (`{`, `}`, `*`, `:`) are rejected since
/// the prefix is registered verbatim as a route path.
#[must_use]
pub fn parse_mount_prefix(raw: &str) -> Option<String> {
    if raw.contains(['{', '}', '*', ':']) {
        return None;
    }
    Some(normalize_route_prefix(raw))
}

/// Split on `delimiter`, trimming each field. Empty fields are kept.
#[must_use]
pub fn split_trimmed(value: &str, delimiter: char) -> Vec<&str> {
    value.split(delimiter).map(str::trim).collect()
}

/// Parse one `prefix,host,port[,mode]` row.
///
/// The row needs at least three fields and a valid port. An empty host
/// falls back to `127.0.0.1`; an unknown mode falls back to `Http`.
#[must_use]
pub fn parse_route_spec(raw: &str) -> Option<ProxyRouteConfig> {
    let fields = split_trimmed(raw, ',');
    if fields.len() < 3 {
        return None;
    }

    let upstream_port = parse_port(fields[2])?;
    let mode = fields
        .get(3)
        .map_or(ProxyMode::Http, |m| parse_proxy_mode(m, ProxyMode::Http));
    let upstream_host = if fields[1].is_empty() {
        DEFAULT_UPSTREAM_HOST.to_string()
    } else {
        fields[1].to_string()
    };

    Some(ProxyRouteConfig {
        route_prefix: normalize_route_prefix(fields[0]),
        upstream_host,
        upstream_port,
        mode,
    })
}

/// Parse a `;`-separated list of route rows, dropping empty and invalid items.
#[must_use]
pub fn parse_route_list(raw: &str) -> Vec<ProxyRouteConfig> {
    split_trimmed(raw, ';')
        .into_iter()
        .filter(|spec| !spec.is_empty())
        .filter_map(parse_route_spec)
        .collect()
}
