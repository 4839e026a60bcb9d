//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from
//! config files; the externally-supplied keys can additionally be
//! overridden from the environment at load time.

use serde::{Deserialize, Serialize};

/// Root configuration for the site gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Contact directory (hosted table) settings.
    pub directory: DirectoryConfig,

    /// Inquiry notification settings.
    pub notify: NotifyConfig,

    /// Payment processor settings.
    pub payments: PaymentsConfig,

    /// Telemetry sink settings.
    pub telemetry: TelemetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Contact directory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the hosted table service.
    pub base_url: String,

    /// API key sent with every insert.
    pub api_key: String,

    /// Table receiving one row per submission.
    pub table: String,

    /// Insert timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            table: "enterprise_contacts".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Inquiry notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Endpoint receiving the notification POST.
    pub endpoint: String,

    /// Fixed recipient address carried in the payload.
    pub recipient: String,

    /// Send timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/notify-enterprise-contact".to_string(),
            recipient: "enterprise@sxc.codes".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Payment processor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentsConfig {
    /// Publishable processor key.
    pub public_key: String,

    /// Processor API base URL.
    pub api_base: String,

    /// Origin used to build the `/payment/complete` return URL.
    pub return_origin: String,

    /// Confirmation timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            return_origin: "http://127.0.0.1:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Telemetry sink configuration. A sink with an empty key or endpoint
/// is disabled rather than failing startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub error_vault: ErrorVaultConfig,
    pub funnel: FunnelConfig,
    pub insight: InsightConfig,

    /// Per-delivery timeout in seconds, shared by all sinks.
    pub timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            error_vault: ErrorVaultConfig::default(),
            funnel: FunnelConfig::default(),
            insight: InsightConfig::default(),
            timeout_secs: 5,
        }
    }
}

/// Error tracking backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ErrorVaultConfig {
    /// Full ingestion endpoint URL.
    pub endpoint: String,
}

/// Funnel analytics backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FunnelConfig {
    /// Write token.
    pub token: String,

    /// Ingestion host, overridable per environment.
    pub endpoint: String,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: "https://api.mixpanel.com".to_string(),
        }
    }
}

/// Product analytics backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Project API key.
    pub api_key: String,

    /// Ingestion host.
    pub host: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: "https://app.posthog.com".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
