//! Layered merge of file entries and environment overrides onto defaults.
//!
//! Nothing here fails. Each recognized key is parsed with the
//! parse-or-default helpers in [`super::parse`]; a value that does not
//! parse leaves the prior value in place and records a
//! [`ConfigWarning`].
//!
//! Route precedence, highest first:
//! 1. `API_PROXY_ROUTES` (when it yields at least one valid row)
//! 2. `API_PROXY_ROUTE_PREFIX` / `_UPSTREAM_HOST` / `_UPSTREAM_PORT` / `API_PROXY_MODE`,
//!    patched onto the first resolved route (skipped entirely when
//!    `API_PROXY_ROUTES` is set)
//! 3. indexed `proxy.route.<id>.<field>` keys, ordered by id
//! 4. flat `proxy.route = prefix,host,port[,mode]` lines
//! 5. the built-in default route

use std::collections::BTreeMap;

use super::env::{self, EnvSource};
use super::file::ConfigEntry;
use super::model::{AppConfig, ConfigWarning, ProxyMode, ProxyRouteConfig, WarningOrigin};
use super::parse::{
    normalize_route_prefix, parse_bool_opt, parse_mount_prefix, parse_port, parse_proxy_mode_opt,
    parse_route_spec, split_trimmed,
};

const INDEXED_ROUTE_PREFIX: &str = "proxy.route.";
const PORT_HINT: &str = "expected an integer between 1 and 65535";
const BOOL_HINT: &str = "expected true/false, yes/no, on/off or 1/0";
const ROUTE_HINT: &str = "expected prefix,host,port[,mode]";
const MODE_HINT: &str = "expected http or raw";
const PREFIX_HINT: &str = "a plain path without '{', '}', '*' or ':'";

/// Fields collected for one `proxy.route.<id>` group.
#[derive(Debug, Default)]
struct IndexedRouteFields {
    prefix: Option<String>,
    upstream_host: Option<String>,
    upstream_port: Option<u16>,
    mode: Option<ProxyMode>,
}

impl IndexedRouteFields {
    /// Absent fields keep the [`ProxyRouteConfig`] defaults, not the
    /// currently configured routes.
    fn into_route(self) -> ProxyRouteConfig {
        let mut route = ProxyRouteConfig::default();
        if let Some(prefix) = self.prefix {
            route.route_prefix = prefix;
        }
        if let Some(host) = self.upstream_host {
            route.upstream_host = host;
        }
        if let Some(port) = self.upstream_port {
            route.upstream_port = port;
        }
        if let Some(mode) = self.mode {
            route.mode = mode;
        }
        route.route_prefix = normalize_route_prefix(&route.route_prefix);
        route
    }
}

struct Warnings<'a>(&'a mut Vec<ConfigWarning>);

impl Warnings<'_> {
    fn file(&mut self, entry: &ConfigEntry, message: impl Into<String>, suggestion: Option<&str>) {
        self.0.push(ConfigWarning {
            origin: WarningOrigin::File { line: entry.line },
            key: entry.key.clone(),
            message: message.into(),
            suggestion: suggestion.map(String::from),
        });
    }

    fn env(&mut self, var: &str, message: impl Into<String>, suggestion: Option<&str>) {
        self.0.push(ConfigWarning {
            origin: WarningOrigin::Env {
                var: var.to_string(),
            },
            key: var.to_string(),
            message: message.into(),
            suggestion: suggestion.map(String::from),
        });
    }
}

/// Apply parsed file entries onto `config`.
pub fn apply_file_config(
    config: &mut AppConfig,
    entries: &[ConfigEntry],
    warnings: &mut Vec<ConfigWarning>,
) {
    let mut warn = Warnings(warnings);
    let mut flat_routes: Vec<ProxyRouteConfig> = Vec::new();
    let mut indexed: BTreeMap<String, IndexedRouteFields> = BTreeMap::new();

    for entry in entries {
        let value = entry.value.as_str();
        match entry.key.as_str() {
            "server.host" => {
                if !value.is_empty() {
                    config.host = value.to_string();
                }
            }
            "server.port" => match parse_port(value) {
                Some(port) => config.port = port,
                None => warn.file(entry, format!("invalid port '{value}'"), Some(PORT_HINT)),
            },
            "static.frontend_root" => {
                if !value.is_empty() {
                    config.frontend_root = value.into();
                }
            }
            "log.dir" => {
                if !value.is_empty() {
                    config.log_dir = value.into();
                }
            }
            "log.file" => {
                if !value.is_empty() {
                    config.log_file = value.to_string();
                }
            }
            "proxy.enabled" => match parse_bool_opt(value) {
                Some(enabled) => config.proxy_enabled = enabled,
                None => warn.file(entry, format!("invalid boolean '{value}'"), Some(BOOL_HINT)),
            },
            "auth.enabled" => match parse_bool_opt(value) {
                Some(enabled) => config.auth.enabled = enabled,
                None => warn.file(entry, format!("invalid boolean '{value}'"), Some(BOOL_HINT)),
            },
            "auth.prefix" => {
                if !value.is_empty() {
                    match parse_mount_prefix(value) {
                        Some(prefix) => config.auth.prefix = prefix,
                        None => warn.file(entry, format!("invalid prefix '{value}'"), Some(PREFIX_HINT)),
                    }
                }
            }
            "proxy.route" => match parse_route_spec(value) {
                Some(route) => flat_routes.push(route),
                None => warn.file(entry, format!("invalid route '{value}'"), Some(ROUTE_HINT)),
            },
            key => {
                if let Some(tail) = key.strip_prefix(INDEXED_ROUTE_PREFIX) {
                    apply_indexed_field(&mut indexed, tail, entry, &mut warn);
                } else {
                    warn.file(entry, "unrecognized key", None);
                }
            }
        }
    }

    let routes = if indexed.is_empty() {
        flat_routes
    } else {
        if let Some(first_flat) = entries.iter().find(|e| e.key == "proxy.route") {
            warn.file(
                first_flat,
                "flat proxy.route lines are ignored because indexed proxy.route.<id>.* keys are present",
                Some("use one route syntax per file"),
            );
        }
        // BTreeMap iteration is ordered by id, byte-wise lexicographic.
        indexed
            .into_values()
            .map(IndexedRouteFields::into_route)
            .collect()
    };

    if !routes.is_empty() {
        config.proxy_routes = dedupe_by_prefix(routes);
    }
}

fn apply_indexed_field(
    indexed: &mut BTreeMap<String, IndexedRouteFields>,
    tail: &str,
    entry: &ConfigEntry,
    warn: &mut Warnings<'_>,
) {
    let Some((id, field)) = tail.split_once('.') else {
        warn.file(entry, "indexed route key needs proxy.route.<id>.<field>", None);
        return;
    };
    if id.is_empty() || field.is_empty() {
        warn.file(entry, "indexed route key needs proxy.route.<id>.<field>", None);
        return;
    }

    let value = entry.value.as_str();
    let current = indexed.entry(id.to_string()).or_default();
    match field {
        "prefix" => {
            if !value.is_empty() {
                current.prefix = Some(value.to_string());
            }
        }
        "upstream_host" => {
            if !value.is_empty() {
                current.upstream_host = Some(value.to_string());
            }
        }
        "upstream_port" => match parse_port(value) {
            Some(port) => current.upstream_port = Some(port),
            None => warn.file(entry, format!("invalid port '{value}'"), Some(PORT_HINT)),
        },
        "mode" => {
            current.mode = Some(parse_proxy_mode_opt(value).unwrap_or_else(|| {
                warn.file(entry, format!("unknown mode '{value}', using http"), Some(MODE_HINT));
                ProxyMode::Http
            }));
        }
        other => warn.file(entry, format!("unknown route field '{other}'"), None),
    }
}

/// Apply environment overrides onto a config that already holds file values.
pub fn apply_env_overrides(
    config: &mut AppConfig,
    vars: &dyn EnvSource,
    warnings: &mut Vec<ConfigWarning>,
) {
    let mut warn = Warnings(warnings);

    if let Some(host) = vars.get(env::HOST) {
        config.host = host;
    }
    if let Some(raw) = vars.get(env::PORT) {
        match parse_port(&raw) {
            Some(port) => config.port = port,
            None => warn.env(env::PORT, format!("invalid port '{raw}'"), Some(PORT_HINT)),
        }
    }
    if let Some(root) = vars.get(env::FRONTEND_ROOT) {
        config.frontend_root = root.into();
    }
    if let Some(dir) = vars.get(env::LOG_DIR) {
        config.log_dir = dir.into();
    }
    if let Some(file) = vars.get(env::LOG_FILE) {
        config.log_file = file;
    }
    if let Some(raw) = vars.get(env::PROXY_ENABLED) {
        match parse_bool_opt(&raw) {
            Some(enabled) => config.proxy_enabled = enabled,
            None => warn.env(env::PROXY_ENABLED, format!("invalid boolean '{raw}'"), Some(BOOL_HINT)),
        }
    }
    if let Some(raw) = vars.get(env::AUTH_ENABLED) {
        match parse_bool_opt(&raw) {
            Some(enabled) => config.auth.enabled = enabled,
            None => warn.env(env::AUTH_ENABLED, format!("invalid boolean '{raw}'"), Some(BOOL_HINT)),
        }
    }
    if let Some(raw) = vars.get(env::AUTH_PREFIX) {
        match parse_mount_prefix(&raw) {
            Some(prefix) => config.auth.prefix = prefix,
            None => warn.env(env::AUTH_PREFIX, format!("invalid prefix '{raw}'"), Some(PREFIX_HINT)),
        }
    }

    if let Some(raw) = vars.get(env::PROXY_ROUTES) {
        apply_route_list_env(config, &raw, vars, &mut warn);
        return;
    }

    apply_single_route_env(config, vars, &mut warn);
}

fn apply_route_list_env(
    config: &mut AppConfig,
    raw: &str,
    vars: &dyn EnvSource,
    warn: &mut Warnings<'_>,
) {
    let mut routes = Vec::new();
    for spec in split_trimmed(raw, ';') {
        if spec.is_empty() {
            continue;
        }
        match parse_route_spec(spec) {
            Some(route) => routes.push(route),
            None => warn.env(env::PROXY_ROUTES, format!("invalid route '{spec}'"), Some(ROUTE_HINT)),
        }
    }

    if routes.is_empty() {
        warn.env(
            env::PROXY_ROUTES,
            "no valid routes, keeping file or default routes",
            None,
        );
    } else {
        config.proxy_routes = dedupe_by_prefix(routes);
    }

    for var in [
        env::PROXY_ROUTE_PREFIX,
        env::PROXY_UPSTREAM_HOST,
        env::PROXY_UPSTREAM_PORT,
        env::PROXY_MODE,
    ] {
        if vars.get(var).is_some() {
            warn.env(var, format!("ignored because {} is set", env::PROXY_ROUTES), None);
        }
    }
}

fn apply_single_route_env(config: &mut AppConfig, vars: &dyn EnvSource, warn: &mut Warnings<'_>) {
    let prefix = vars.get(env::PROXY_ROUTE_PREFIX);
    let host = vars.get(env::PROXY_UPSTREAM_HOST);
    let port = vars.get(env::PROXY_UPSTREAM_PORT);
    let mode = vars.get(env::PROXY_MODE);

    if prefix.is_none() && host.is_none() && port.is_none() && mode.is_none() {
        return;
    }

    let mut route = config.proxy_routes.first().cloned().unwrap_or_default();
    if let Some(prefix) = prefix {
        route.route_prefix = prefix;
    }
    if let Some(host) = host {
        route.upstream_host = host;
    }
    if let Some(raw) = port {
        match parse_port(&raw) {
            Some(port) => route.upstream_port = port,
            None => warn.env(env::PROXY_UPSTREAM_PORT, format!("invalid port '{raw}'"), Some(PORT_HINT)),
        }
    }
    if let Some(raw) = mode {
        match parse_proxy_mode_opt(&raw) {
            Some(mode) => route.mode = mode,
            None => warn.env(
                env::PROXY_MODE,
                format!("unknown mode '{raw}', keeping {}", route.mode),
                Some(MODE_HINT),
            ),
        }
    }
    route.route_prefix = normalize_route_prefix(&route.route_prefix);

    config.proxy_routes = vec![route];
}

/// Collapse routes sharing a prefix: the last definition wins and takes
/// the position of the first.
#[must_use]
pub fn dedupe_by_prefix(routes: Vec<ProxyRouteConfig>) -> Vec<ProxyRouteConfig> {
    let mut out: Vec<ProxyRouteConfig> = Vec::with_capacity(routes.len());
    for route in routes {
        match out.iter_mut().find(|r| r.route_prefix == route.route_prefix) {
            Some(existing) => *existing = route,
            None => out.push(route),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::file::parse_entries;

    fn from_file(text: &str) -> (AppConfig, Vec<ConfigWarning>) {
        let mut config = AppConfig::default();
        let mut warnings = Vec::new();
        apply_file_config(&mut config, &parse_entries(text), &mut warnings);
        (config, warnings)
    }

    fn with_env(mut config: AppConfig, vars: &[(&str, &str)]) -> (AppConfig, Vec<ConfigWarning>) {
        let env_vars: HashMap<&str, &str> = vars.iter().copied().collect();
        let mut warnings = Vec::new();
        apply_env_overrides(&mut config, &env_vars, &mut warnings);
        (config, warnings)
    }

    #[test]
    fn scalar_keys_apply() {
        let (config, warnings) = from_file(
            "server.host = 127.0.0.1\nserver.port = 8088\nstatic.frontend_root = /srv/www\n\
             log.dir = /tmp/logs\nlog.file = edge.log\nproxy.enabled = off\n",
        );
        assert!(warnings.is_empty());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8088);
        assert_eq!(config.frontend_root.to_str(), Some("/srv/www"));
        assert_eq!(config.log_path().to_str(), Some("/tmp/logs/edge.log"));
        assert!(!config.proxy_enabled);
    }

    #[test]
    fn bad_scalar_values_keep_prior() {
        let (config, warnings) =
            from_file("server.port = 8088\nserver.port = nope\nproxy.enabled = maybe\nserver.host =\n");
        assert_eq!(config.port, 8088);
        assert!(config.proxy_enabled);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].origin, WarningOrigin::File { line: 2 });
    }

    #[test]
    fn flat_routes_replace_default() {
        let (config, _) = from_file("proxy.route = api/,10.0.0.1,9000\nproxy.route = /chat,10.0.0.2,9001,raw\n");
        assert_eq!(config.proxy_routes.len(), 2);
        assert_eq!(config.proxy_routes[0].route_prefix, "/api");
        assert_eq!(config.proxy_routes[0].mode, ProxyMode::Http);
        assert_eq!(config.proxy_routes[1].mode, ProxyMode::Raw);
    }

    #[test]
    fn invalid_flat_routes_keep_default() {
        let (config, warnings) = from_file("proxy.route = /api,host\n");
        assert_eq!(config.proxy_routes, vec![ProxyRouteConfig::default()]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn indexed_routes_sort_by_id() {
        let (config, _) = from_file(
            "proxy.route.b.prefix = /beta\nproxy.route.b.upstream_port = 9002\n\
             proxy.route.a.prefix = /alpha\nproxy.route.a.upstream_host = alpha.local\n",
        );
        let prefixes: Vec<_> = config.proxy_routes.iter().map(|r| r.route_prefix.as_str()).collect();
        assert_eq!(prefixes, ["/alpha", "/beta"]);
        assert_eq!(config.proxy_routes[0].upstream_host, "alpha.local");
        assert_eq!(config.proxy_routes[0].upstream_port, 8080);
        assert_eq!(config.proxy_routes[1].upstream_host, "127.0.0.1");
        assert_eq!(config.proxy_routes[1].upstream_port, 9002);
    }

    #[test]
    fn indexed_fields_default_to_route_defaults_not_app_config() {
        let mut base = AppConfig::default();
        base.proxy_routes = vec![ProxyRouteConfig {
            route_prefix: "/custom".into(),
            upstream_host: "custom.local".into(),
            upstream_port: 1234,
            mode: ProxyMode::Raw,
        }];
        let mut warnings = Vec::new();
        apply_file_config(&mut base, &parse_entries("proxy.route.x.mode = bogus\n"), &mut warnings);
        assert_eq!(base.proxy_routes, vec![ProxyRouteConfig::default()]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn indexed_syntax_overrides_flat_syntax() {
        let (config, warnings) = from_file(
            "proxy.route = /flat,flat.local,7000\nproxy.route.1.prefix = /indexed\n",
        );
        assert_eq!(config.proxy_routes.len(), 1);
        assert_eq!(config.proxy_routes[0].route_prefix, "/indexed");
        assert!(warnings.iter().any(|w| w.message.contains("flat proxy.route")));
    }

    #[test]
    fn malformed_indexed_keys_are_ignored() {
        let (config, warnings) = from_file("proxy.route.nodot = x\nproxy.route..prefix = /a\nproxy.route.a. = b\n");
        assert_eq!(config.proxy_routes, vec![ProxyRouteConfig::default()]);
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn duplicate_prefix_last_writer_wins() {
        let (config, _) = from_file("proxy.route = /api,a,1\nproxy.route = /b,b,2\nproxy.route = /api/,c,3\n");
        assert_eq!(config.proxy_routes.len(), 2);
        assert_eq!(config.proxy_routes[0].route_prefix, "/api");
        assert_eq!(config.proxy_routes[0].upstream_host, "c");
        assert_eq!(config.proxy_routes[1].route_prefix, "/b");
    }

    #[test]
    fn auth_keys_apply() {
        let (config, _) = from_file("auth.enabled = no\nauth.prefix = auth/\n");
        assert!(!config.auth.enabled);
        assert_eq!(config.auth.prefix, "/auth");
    }

    #[test]
    fn auth_prefix_with_router_syntax_is_ignored() {
        let (config, warnings) = from_file("auth.prefix = /api/{user}\n");
        assert_eq!(config.auth.prefix, "/api/auth");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "auth.prefix");
    }

    #[test]
    fn unrecognized_key_warns() {
        let (_, warnings) = from_file("server.portt = 1\n");
        assert_eq!(warnings[0].message, "unrecognized key");
    }

    #[test]
    fn env_scalars_override_file() {
        let (file, _) = from_file("server.port = 8088\nserver.host = a\n");
        let (config, warnings) = with_env(
            file,
            &[(env::PORT, "9090"), (env::HOST, "  "), (env::PROXY_ENABLED, "false")],
        );
        assert!(warnings.is_empty());
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "a");
        assert!(!config.proxy_enabled);
    }

    #[test]
    fn env_route_list_wins_over_scalars() {
        let (config, warnings) = with_env(
            AppConfig::default(),
            &[
                (env::PROXY_ROUTES, "/x,1.2.3.4,9000;/y,5.6.7.8,9001,raw"),
                (env::PROXY_ROUTE_PREFIX, "/ignored"),
            ],
        );
        assert_eq!(config.proxy_routes.len(), 2);
        assert_eq!(config.proxy_routes[0].route_prefix, "/x");
        assert_eq!(config.proxy_routes[0].mode, ProxyMode::Http);
        assert_eq!(config.proxy_routes[1].upstream_host, "5.6.7.8");
        assert_eq!(config.proxy_routes[1].mode, ProxyMode::Raw);
        assert!(warnings.iter().any(|w| w.key == env::PROXY_ROUTE_PREFIX));
    }

    #[test]
    fn empty_env_route_list_still_suppresses_scalars() {
        let (file, _) = from_file("proxy.route = /file,f,1\n");
        let (config, _) = with_env(
            file,
            &[(env::PROXY_ROUTES, "garbage;;"), (env::PROXY_UPSTREAM_PORT, "9999")],
        );
        assert_eq!(config.proxy_routes.len(), 1);
        assert_eq!(config.proxy_routes[0].route_prefix, "/file");
        assert_eq!(config.proxy_routes[0].upstream_port, 1);
    }

    #[test]
    fn env_scalars_patch_first_route_and_truncate() {
        let (file, _) = from_file("proxy.route = /a,a.local,1\nproxy.route = /b,b.local,2,raw\n");
        let (config, _) = with_env(
            file,
            &[(env::PROXY_UPSTREAM_PORT, "7000"), (env::PROXY_ROUTE_PREFIX, "v1/")],
        );
        assert_eq!(config.proxy_routes.len(), 1);
        let route = &config.proxy_routes[0];
        assert_eq!(route.route_prefix, "/v1");
        assert_eq!(route.upstream_host, "a.local");
        assert_eq!(route.upstream_port, 7000);
        assert_eq!(route.mode, ProxyMode::Http);
    }

    #[test]
    fn env_scalars_seed_route_when_list_empty() {
        let mut base = AppConfig::default();
        base.proxy_routes.clear();
        let (config, _) = with_env(base, &[(env::PROXY_MODE, "raw")]);
        assert_eq!(config.proxy_routes.len(), 1);
        assert_eq!(config.proxy_routes[0].route_prefix, "/api");
        assert_eq!(config.proxy_routes[0].mode, ProxyMode::Raw);
    }

    #[test]
    fn env_bad_mode_keeps_route_mode() {
        let (file, _) = from_file("proxy.route = /a,a,1,raw\n");
        let (config, warnings) = with_env(file, &[(env::PROXY_MODE, "tcp")]);
        assert_eq!(config.proxy_routes[0].mode, ProxyMode::Raw);
        assert_eq!(warnings.len(), 1);
    }
}
