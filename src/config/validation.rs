//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Validation is a
//! pure function over the config and returns every error found, not
//! just the first, so a misconfigured deployment reads one report
//! instead of replaying startup per mistake.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// One semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field,
            message: format!("'{}' is not a valid socket address", value),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if Url::parse(value).is_err() {
        errors.push(ValidationError {
            field,
            message: format!("'{}' is not a valid URL", value),
        });
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "server.bind_address", &config.server.bind_address);
    check_nonzero(
        &mut errors,
        "server.request_timeout_secs",
        config.server.request_timeout_secs,
    );

    if config.directory.base_url.is_empty() {
        errors.push(ValidationError {
            field: "directory.base_url",
            message: "must be set".to_string(),
        });
    } else {
        check_url(&mut errors, "directory.base_url", &config.directory.base_url);
    }
    if config.directory.table.is_empty() {
        errors.push(ValidationError {
            field: "directory.table",
            message: "must be set".to_string(),
        });
    }
    check_nonzero(&mut errors, "directory.timeout_secs", config.directory.timeout_secs);

    check_url(&mut errors, "notify.endpoint", &config.notify.endpoint);
    if config.notify.recipient.is_empty() {
        errors.push(ValidationError {
            field: "notify.recipient",
            message: "must be set".to_string(),
        });
    }

    if config.payments.public_key.is_empty() {
        errors.push(ValidationError {
            field: "payments.public_key",
            message: "must be set".to_string(),
        });
    }
    check_url(&mut errors, "payments.api_base", &config.payments.api_base);
    check_url(&mut errors, "payments.return_origin", &config.payments.return_origin);
    check_nonzero(&mut errors, "payments.timeout_secs", config.payments.timeout_secs);

    // Sinks are optional; only validate endpoints for sinks that are
    // actually enabled by a key.
    if !config.telemetry.error_vault.endpoint.is_empty() {
        check_url(
            &mut errors,
            "telemetry.error_vault.endpoint",
            &config.telemetry.error_vault.endpoint,
        );
    }
    if !config.telemetry.funnel.token.is_empty() {
        check_url(&mut errors, "telemetry.funnel.endpoint", &config.telemetry.funnel.endpoint);
    }
    if !config.telemetry.insight.api_key.is_empty() {
        check_url(&mut errors, "telemetry.insight.host", &config.telemetry.insight.host);
    }
    check_nonzero(&mut errors, "telemetry.timeout_secs", config.telemetry.timeout_secs);

    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
