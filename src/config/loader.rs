//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Environment variables overriding the externally-supplied keys.
/// Read once at load time.
const ENV_OVERRIDES: &[(&str, fn(&mut GatewayConfig, String))] = &[
    ("GATEWAY_DIRECTORY_API_KEY", |c, v| c.directory.api_key = v),
    ("GATEWAY_PAYMENTS_PUBLIC_KEY", |c, v| c.payments.public_key = v),
    ("GATEWAY_ERROR_VAULT_ENDPOINT", |c, v| {
        c.telemetry.error_vault.endpoint = v
    }),
    ("GATEWAY_FUNNEL_TOKEN", |c, v| c.telemetry.funnel.token = v),
    ("GATEWAY_FUNNEL_ENDPOINT", |c, v| c.telemetry.funnel.endpoint = v),
    ("GATEWAY_INSIGHT_KEY", |c, v| c.telemetry.insight.api_key = v),
    ("GATEWAY_INSIGHT_HOST", |c, v| c.telemetry.insight.host = v),
];

/// Apply environment overrides to an already-parsed configuration.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    for (name, apply) in ENV_OVERRIDES {
        if let Ok(value) = std::env::var(name) {
            if !value.is_empty() {
                apply(config, value);
            }
        }
    }
}

/// Load, override and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_replaces_file_value() {
        let mut config = GatewayConfig::default();
        config.payments.public_key = "pk_from_file".to_string();

        // Scoped to this test's variable; tests that read the same
        // variable would need to serialize, so each test uses its own.
        std::env::set_var("GATEWAY_PAYMENTS_PUBLIC_KEY", "pk_from_env");
        apply_env_overrides(&mut config);
        std::env::remove_var("GATEWAY_PAYMENTS_PUBLIC_KEY");

        assert_eq!(config.payments.public_key, "pk_from_env");
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let mut config = GatewayConfig::default();
        config.telemetry.funnel.token = "t-file".to_string();

        std::env::set_var("GATEWAY_FUNNEL_TOKEN", "");
        apply_env_overrides(&mut config);
        std::env::remove_var("GATEWAY_FUNNEL_TOKEN");

        assert_eq!(config.telemetry.funnel.token, "t-file");
    }
}
