//! Longest-prefix matching of request paths to proxy routes.
//!
//! [`match_route`] compares the request path against every configured
//! `route_prefix` on segment boundaries and picks the longest match. The
//! returned path is what the upstream sees: the request path with the
//! prefix removed, never empty.

use crate::config::model::ProxyRouteConfig;

/// Returns true when `path` falls under `prefix` on a segment boundary.
///
/// `/api` covers `/api` and `/api/x` but not `/apix`; `/` covers everything.
#[must_use]
pub fn prefix_covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Path forwarded upstream once `prefix` is removed.
#[must_use]
pub fn strip_prefix<'a>(prefix: &str, path: &'a str) -> &'a str {
    if prefix == "/" {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some("") | None => "/",
        Some(rest) => rest,
    }
}

/// Find the route for `path`.
///
/// Returns the route index and the upstream path. On equal prefix
/// lengths the earlier route wins, which only matters for configs that
/// bypassed deduplication.
#[must_use]
pub fn match_route<'a>(routes: &[ProxyRouteConfig], path: &'a str) -> Option<(usize, &'a str)> {
    let mut best: Option<(usize, usize)> = None;

    for (idx, route) in routes.iter().enumerate() {
        let prefix = route.route_prefix.as_str();
        if !prefix_covers(prefix, path) {
            continue;
        }
        match best {
            Some((_, len)) if len >= prefix.len() => {}
            _ => best = Some((idx, prefix.len())),
        }
    }

    best.map(|(idx, _)| (idx, strip_prefix(&routes[idx].route_prefix, path)))
}
