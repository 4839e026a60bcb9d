//! Public HTTP surface of the gateway.

pub mod handlers;
pub mod server;

pub use server::{AppState, BuildError, HttpServer};
