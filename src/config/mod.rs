//! Layered runtime configuration.
//!
//! Resolution runs once at startup: built-in defaults, then the
//! `key = value` file ([`file`]), then environment overrides ([`env`]),
//! merged by [`merge`]. The result is an immutable [`LoadedAppConfig`].
//! Loading never fails; unusable inputs degrade to the prior value and
//! are reported as [`ConfigWarning`](model::ConfigWarning)s.

pub mod env;
pub mod file;
pub mod merge;
pub mod model;
pub mod parse;
pub mod validation;

use std::path::{Path, PathBuf};

use env::{EnvSource, ProcessEnv};
use model::{AppConfig, LoadedAppConfig, DEFAULT_CONFIG_PATH};

/// Load configuration from the process environment and the resolved file.
#[must_use]
pub fn load_app_config() -> LoadedAppConfig {
    load_app_config_with(&ProcessEnv, None)
}

/// Load configuration from an arbitrary environment.
///
/// `explicit_path` takes precedence over `STATIC_CONFIG_PATH`, which takes
/// precedence over [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn load_app_config_with(vars: &dyn EnvSource, explicit_path: Option<&Path>) -> LoadedAppConfig {
    let config_path = resolve_config_path(vars, explicit_path);

    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    let entries = file::load_entries(&config_path);
    let file_config_loaded = entries.is_some();
    if let Some(entries) = entries {
        merge::apply_file_config(&mut config, &entries, &mut warnings);
    }
    merge::apply_env_overrides(&mut config, vars, &mut warnings);

    LoadedAppConfig {
        config,
        config_path,
        file_config_loaded,
        warnings,
    }
}

fn resolve_config_path(vars: &dyn EnvSource, explicit_path: Option<&Path>) -> PathBuf {
    explicit_path.map_or_else(
        || {
            vars.get(env::CONFIG_PATH)
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
        },
        Path::to_path_buf,
    )
}
