//! Observability subsystem.
//!
//! Structured logging via `tracing` and a Prometheus metrics endpoint.
//! These are the gateway's own operational signals, separate from the
//! product telemetry fanned out by [`crate::telemetry`].

pub mod logging;
pub mod metrics;
