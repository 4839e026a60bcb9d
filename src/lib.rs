//! Site gateway library.
//!
//! Glues a web product's presentation layer to its hosted SaaS
//! backends: a validated contact-inquiry pipeline writing to a hosted
//! table with a best-effort notification, a checkout session wrapping
//! one payment confirmation attempt, and a telemetry façade fanning
//! events out to three external tracking services with per-sink
//! failure isolation.

pub mod config;
pub mod contact;
pub mod error;
pub mod http;
pub mod observability;
pub mod payments;
pub mod telemetry;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use telemetry::Telemetry;
