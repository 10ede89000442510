//! Consistency checks on a fully resolved configuration.
//!
//! [`check`] looks for setups that load fine but will not behave as the
//! operator probably intended: proxy enabled with no routes or a missing
//! frontend directory. Results are [`ConfigWarning`]s; nothing here
//! rejects a config.
//!
//! An auth mount under a proxy prefix is not a warning. The auth routes
//! are registered explicitly and always win over the proxy fallback, so
//! the report only notes which proxy prefix they shadow.

use super::model::{AppConfig, ConfigWarning, LoadedAppConfig, WarningOrigin};
use crate::proxy::routing::prefix_covers;

fn resolved(key: &str, message: String, suggestion: Option<String>) -> ConfigWarning {
    ConfigWarning {
        origin: WarningOrigin::Resolved,
        key: key.to_string(),
        message,
        suggestion,
    }
}

#[must_use]
pub fn check(config: &AppConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.proxy_enabled && config.proxy_routes.is_empty() {
        warnings.push(resolved(
            "proxy.enabled",
            "proxy is enabled but no routes are configured, proxy mount skipped".into(),
            Some("add a proxy.route line or set API_PROXY_ROUTES".into()),
        ));
    }

    if !config.frontend_root.is_dir() {
        warnings.push(resolved(
            "static.frontend_root",
            format!("{} is not a directory", config.frontend_root.display()),
            Some("static requests will return 404".into()),
        ));
    }

    warnings
}

/// The longest proxy prefix that also covers the auth mount, if any.
#[must_use]
pub fn shadowed_proxy_prefix(config: &AppConfig) -> Option<&str> {
    if !config.auth.enabled || !config.proxy_enabled {
        return None;
    }
    config
        .proxy_routes
        .iter()
        .map(|route| route.route_prefix.as_str())
        .filter(|prefix| prefix_covers(prefix, &config.auth.prefix))
        .max_by_key(|prefix| prefix.len())
}

#[must_use]
pub fn format_validation_report(loaded: &LoadedAppConfig) -> String {
    let config = &loaded.config;
    let mut lines = vec![format!(
        "{} ({})",
        loaded.config_path.display(),
        loaded.load_state()
    )];

    lines.push(format!("  listen:   {}", config.bind_address()));
    lines.push(format!("  frontend: {}", config.frontend_root.display()));
    lines.push(format!("  log:      {}", config.log_path().display()));
    if config.auth.enabled {
        match shadowed_proxy_prefix(config) {
            Some(proxy) => lines.push(format!(
                "  auth:     {} (served locally, ahead of proxy {proxy})",
                config.auth.prefix
            )),
            None => lines.push(format!("  auth:     {}", config.auth.prefix)),
        }
    } else {
        lines.push("  auth:     disabled".to_string());
    }

    if config.proxy_enabled {
        lines.push(format!("  proxy:    {} routes", config.proxy_routes.len()));
        for route in &config.proxy_routes {
            lines.push(format!(
                "    {}  -> {} ({})",
                route.route_prefix,
                route.upstream_authority(),
                route.mode
            ));
        }
    } else {
        lines.push("  proxy:    disabled".to_string());
    }

    lines.join("\n")
}
