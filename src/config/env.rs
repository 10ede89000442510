//! Environment variable lookup for config overrides.
//!
//! [`EnvSource`] abstracts the process environment so the merge logic
//! can be exercised with a plain map. Values are trimmed and an empty
//! or all-whitespace value counts as unset.

use std::collections::HashMap;

pub const CONFIG_PATH: &str = "STATIC_CONFIG_PATH";
pub const HOST: &str = "STATIC_HOST";
pub const PORT: &str = "STATIC_PORT";
pub const FRONTEND_ROOT: &str = "STATIC_FRONTEND_ROOT";
pub const LOG_DIR: &str = "STATIC_LOG_DIR";
pub const LOG_FILE: &str = "STATIC_LOG_FILE";
pub const AUTH_ENABLED: &str = "STATIC_AUTH_ENABLED";
pub const AUTH_PREFIX: &str = "STATIC_AUTH_PREFIX";
pub const PROXY_ENABLED: &str = "API_PROXY_ENABLED";
pub const PROXY_ROUTES: &str = "API_PROXY_ROUTES";
pub const PROXY_ROUTE_PREFIX: &str = "API_PROXY_ROUTE_PREFIX";
pub const PROXY_UPSTREAM_HOST: &str = "API_PROXY_UPSTREAM_HOST";
pub const PROXY_UPSTREAM_PORT: &str = "API_PROXY_UPSTREAM_PORT";
pub const PROXY_MODE: &str = "API_PROXY_MODE";

pub trait EnvSource {
    /// Raw lookup; `None` when the variable is unset or not valid UTF-8.
    fn raw(&self, key: &str) -> Option<String>;

    /// Trimmed lookup where blank values are treated as unset.
    fn get(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn raw(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn raw(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| (*v).to_string())
    }
}
