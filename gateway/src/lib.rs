//! Custodia Gateway
//!
//! The gateway is the HTTP facade over the ledger core: it authenticates
//! API callers, maps them to ledger addresses, validates the shape of
//! inbound address strings, and translates core failures into transport
//! responses. It contains no ledger logic of its own.

pub mod auth;
pub mod config;
pub mod metrics;
pub mod routes;

pub use auth::ApiKeyDirectory;
pub use config::GatewayConfig;
pub use metrics::Metrics;
