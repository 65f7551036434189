//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting development or production.
pub const ENV_MODE: &str = "GATEWAY_MODE";
/// Environment variable overriding the primary production domain.
pub const ENV_BASE_HOST: &str = "GATEWAY_BASE_HOST";
/// Environment variable overriding the preview deployment suffix.
pub const ENV_PREVIEW_SUFFIX: &str = "GATEWAY_PREVIEW_SUFFIX";
/// Environment variable overriding the public base URL.
pub const ENV_BASE_URL: &str = "GATEWAY_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied before validation.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse, override and validate configuration text.
pub fn parse_config<F>(content: &str, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: GatewayConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply deployment overrides from an environment lookup.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = env(ENV_MODE) {
        // FromStr for DeploymentMode never fails.
        config.deployment.mode = mode.parse().unwrap_or_default();
    }
    if let Some(host) = env(ENV_BASE_HOST).filter(|v| !v.is_empty()) {
        config.deployment.base_host = host;
    }
    if let Some(suffix) = env(ENV_PREVIEW_SUFFIX).filter(|v| !v.is_empty()) {
        config.deployment.preview_suffix = suffix;
    }
    if let Some(url) = env(ENV_BASE_URL).filter(|v| !v.is_empty()) {
        config.deployment.base_url = url;
    }
}
