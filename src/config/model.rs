//! Data structures for the resolved edge configuration.
//!
//! Contains [`AppConfig`] (the root), [`ProxyRouteConfig`],
//! [`ProxyMode`], and [`LoadedAppConfig`], the immutable snapshot
//! produced once at startup. All types serialize so the `validate`
//! command can print the resolved result.

use std::path::PathBuf;

use serde::Serialize;

pub const DEFAULT_CONFIG_PATH: &str = "/app/config/static-server.conf";
pub const DEFAULT_UPSTREAM_HOST: &str = "127.0.0.1";
pub const DEFAULT_AUTH_PREFIX: &str = "/api/auth";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    /// Buffered request/response forwarding.
    #[default]
    Http,
    /// Unbuffered pass-through of request and response bodies.
    Raw,
}

impl ProxyMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRouteConfig {
    pub route_prefix: String,
    pub upstream_host: String,
    pub upstream_port: u16,
    pub mode: ProxyMode,
}

impl Default for ProxyRouteConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/api".to_string(),
            upstream_host: DEFAULT_UPSTREAM_HOST.to_string(),
            upstream_port: 8080,
            mode: ProxyMode::Http,
        }
    }
}

impl ProxyRouteConfig {
    #[must_use]
    pub fn upstream_authority(&self) -> String {
        if self.upstream_host.contains(':') && !self.upstream_host.starts_with('[') {
            format!("[{}]:{}", self.upstream_host, self.upstream_port)
        } else {
            format!("{}:{}", self.upstream_host, self.upstream_port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthConfig {
    pub enabled: bool,
    pub prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: DEFAULT_AUTH_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_root: PathBuf,
    pub log_dir: PathBuf,
    pub log_file: String,
    pub proxy_enabled: bool,
    pub proxy_routes: Vec<ProxyRouteConfig>,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            frontend_root: PathBuf::from("/app/frontend"),
            log_dir: PathBuf::from("/app/logs"),
            log_file: "static-server.log".to_string(),
            proxy_enabled: true,
            proxy_routes: vec![ProxyRouteConfig::default()],
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        // Bare IPv6 literals need brackets to form a socket address.
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Where an ignored configuration input came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WarningOrigin {
    File { line: usize },
    Env { var: String },
    /// Raised by checks on the fully merged config.
    Resolved,
}

impl std::fmt::Display for WarningOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { line } => write!(f, "line {line}"),
            Self::Env { var } => write!(f, "${var}"),
            Self::Resolved => f.write_str("resolved"),
        }
    }
}

/// An input that was ignored while resolving the configuration.
///
/// Warnings are informational only: the value they describe has
/// already fallen back to its prior or default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    pub origin: WarningOrigin,
    pub key: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}: {}", self.origin, self.key, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub file_config_loaded: bool,
    pub warnings: Vec<ConfigWarning>,
}

impl LoadedAppConfig {
    #[must_use]
    pub const fn load_state(&self) -> &'static str {
        if self.file_config_loaded {
            "loaded"
        } else {
            "default-or-env"
        }
    }
}
