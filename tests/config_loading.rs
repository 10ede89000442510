//! Integration tests for layered config resolution: defaults, file, env.

mod common;

use std::collections::HashMap;
use std::path::PathBuf;

use common::{temp_dir, write_file};
use edgeport::config::load_app_config_with;
use edgeport::config::model::{AppConfig, ProxyMode, WarningOrigin};

fn no_env() -> HashMap<&'static str, &'static str> {
    HashMap::new()
}

#[test]
fn file_values_override_defaults() {
    let dir = temp_dir();
    let path = write_file(
        &dir,
        "static-server.conf",
        "# edge\n\
         server.host = 127.0.0.1\n\
         server.port = 8088\n\
         static.frontend_root = /srv/www\n\
         log.dir = /var/log/edge\n\
         log.file = edge.log\n\
         proxy.route = /api,backend,9000\n\
         proxy.route = /api/mcp,mcp,9100,raw\n",
    );

    let loaded = load_app_config_with(&no_env(), Some(&path));

    assert!(loaded.file_config_loaded);
    assert_eq!(loaded.load_state(), "loaded");
    assert!(loaded.warnings.is_empty());
    let config = &loaded.config;
    assert_eq!(config.bind_address(), "127.0.0.1:8088");
    assert_eq!(config.frontend_root, PathBuf::from("/srv/www"));
    assert_eq!(config.log_path(), PathBuf::from("/var/log/edge/edge.log"));
    assert_eq!(config.proxy_routes.len(), 2);
    assert_eq!(config.proxy_routes[1].route_prefix, "/api/mcp");
    assert_eq!(config.proxy_routes[1].mode, ProxyMode::Raw);
}

#[test]
fn env_path_and_overrides_apply_after_file() {
    let dir = temp_dir();
    let path = write_file(
        &dir,
        "edge.conf",
        "server.port = 8088\nproxy.route = /api,backend,9000\n",
    );
    let path_str = path.to_str().unwrap().to_string();
    let env: HashMap<String, String> = HashMap::from([
        ("STATIC_CONFIG_PATH".to_string(), path_str),
        ("STATIC_PORT".to_string(), " 9090 ".to_string()),
        ("API_PROXY_UPSTREAM_HOST".to_string(), "other".to_string()),
    ]);

    let loaded = load_app_config_with(&env, None);

    assert!(loaded.file_config_loaded);
    assert_eq!(loaded.config_path, path);
    assert_eq!(loaded.config.port, 9090);
    assert_eq!(loaded.config.proxy_routes.len(), 1);
    assert_eq!(loaded.config.proxy_routes[0].route_prefix, "/api");
    assert_eq!(loaded.config.proxy_routes[0].upstream_host, "other");
    assert_eq!(loaded.config.proxy_routes[0].upstream_port, 9000);
}

#[test]
fn indexed_routes_sort_by_id_and_replace_flat_lines() {
    let dir = temp_dir();
    let path = write_file(
        &dir,
        "edge.conf",
        "proxy.route = /legacy,old,1\n\
         proxy.route.b.prefix = /second\n\
         proxy.route.b.upstream_port = 9002\n\
         proxy.route.a.prefix = /first\n\
         proxy.route.a.upstream_host = alpha\n\
         proxy.route.a.mode = raw\n",
    );

    let loaded = load_app_config_with(&no_env(), Some(&path));

    let routes = &loaded.config.proxy_routes;
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].route_prefix, "/first");
    assert_eq!(routes[0].upstream_host, "alpha");
    assert_eq!(routes[0].upstream_port, 8080);
    assert_eq!(routes[0].mode, ProxyMode::Raw);
    assert_eq!(routes[1].route_prefix, "/second");
    assert_eq!(routes[1].upstream_host, "127.0.0.1");
    assert_eq!(routes[1].upstream_port, 9002);
    assert!(loaded
        .warnings
        .iter()
        .any(|w| w.key == "proxy.route" && matches!(w.origin, WarningOrigin::File { .. })));
}

#[test]
fn route_list_env_suppresses_scalar_route_vars() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("STATIC_CONFIG_PATH", "/nonexistent/edge.conf"),
        ("API_PROXY_ROUTES", "/a,h1,1;/b,h2,2,raw;bogus"),
        ("API_PROXY_UPSTREAM_PORT", "9999"),
    ]);

    let loaded = load_app_config_with(&env, None);

    assert!(!loaded.file_config_loaded);
    let routes = &loaded.config.proxy_routes;
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].upstream_port, 1);
    assert_eq!(routes[1].mode, ProxyMode::Raw);
    assert!(loaded
        .warnings
        .iter()
        .any(|w| w.origin == WarningOrigin::Env { var: "API_PROXY_UPSTREAM_PORT".into() }));
}

#[test]
fn bad_values_keep_prior_and_warn() {
    let dir = temp_dir();
    let path = write_file(
        &dir,
        "edge.conf",
        "server.port = 0\nproxy.enabled = maybe\nproxy.route = /x,host\nno equals sign\n",
    );

    let loaded = load_app_config_with(&no_env(), Some(&path));

    assert_eq!(loaded.config, AppConfig::default());
    let lines: Vec<usize> = loaded
        .warnings
        .iter()
        .filter_map(|w| match w.origin {
            WarningOrigin::File { line } => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn non_utf8_bytes_do_not_discard_the_file() {
    let dir = temp_dir();
    let path = dir.path().join("edge.conf");
    std::fs::write(&path, b"# caf\xe9 comment\nserver.port = 8088\nproxy.enabled = off\n").unwrap();

    let loaded = load_app_config_with(&no_env(), Some(&path));

    assert!(loaded.file_config_loaded);
    assert_eq!(loaded.config.port, 8088);
    assert!(!loaded.config.proxy_enabled);
    assert!(loaded.warnings.is_empty());
}

#[test]
fn missing_file_yields_defaults() {
    let dir = temp_dir();
    let loaded = load_app_config_with(&no_env(), Some(&dir.path().join("absent.conf")));
    assert!(!loaded.file_config_loaded);
    assert_eq!(loaded.load_state(), "default-or-env");
    assert_eq!(loaded.config, AppConfig::default());
    assert!(loaded.warnings.is_empty());
}
