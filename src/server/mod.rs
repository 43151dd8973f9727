//! HTTP server exposing the action gateway.
//!
//! # Endpoints
//!
//! - `GET  /health`              - Liveness probe
//! - `GET  /capabilities`        - Capability listing with JSON schemas
//! - `POST /actions/:capability` - Run a capability

pub mod routes;

pub use routes::{app_router, AppState};
