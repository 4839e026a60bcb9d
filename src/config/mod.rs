//! Configuration management.
//!
//! Schema, TOML loading, environment overrides for externally-supplied
//! keys, and semantic validation that reports every error at once.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::GatewayConfig;
pub use validation::{validate_config, ValidationError};
