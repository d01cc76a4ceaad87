//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the origin base URL.
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Overrides the forward-proxy URL.
pub const ENV_HTTP_PROXY: &str = "HTTP_PROXY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A validated configuration and the environment variables that shaped it.
///
/// Overrides are reported rather than logged here because loading happens
/// before the subscriber is installed.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RelayConfig,
    pub env_overrides: Vec<&'static str>,
}

/// Parse a TOML file without validating it.
pub fn load_config_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply `BASE_URL` / `HTTP_PROXY` on top of `config`, returning the names
/// of the variables that took effect.
///
/// Empty values are ignored so an exported-but-blank variable keeps the
/// file or compiled-in default.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
        config.upstream.base_url = base_url;
        applied.push(ENV_BASE_URL);
    }
    if let Some(proxy_url) = lookup(ENV_HTTP_PROXY).filter(|v| !v.is_empty()) {
        config.upstream.proxy_url = proxy_url;
        applied.push(ENV_HTTP_PROXY);
    }
    applied
}

/// Build the startup configuration: defaults, then the optional file, then
/// the environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => RelayConfig::default(),
    };

    let env_overrides = apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig {
        config,
        env_overrides,
    })
}
