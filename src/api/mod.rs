//! API layer for the relay.
//!
//! This module contains the HTTP handlers, request/response models,
//! upstream HTTP helpers and the OpenAPI document.

pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod upstream;

// Re-export commonly used types
pub use handlers::{health_handler, metrics_handler, relay_handler, AppState};
pub use models::{ErrorBody, HealthResponse, RelayRequest, RelayResponse};
pub use openapi::ApiDoc;
pub use routes::{build_router, with_middleware, RELAY_ALIAS_PATH, RELAY_PATH};
