//! NetAssist Relay - a message relay between a network engineering chat UI
//! and a hosted generative model.
//!
//! The relay accepts a question from the browser, validates it, wraps it in a
//! networking-expert prompt, makes exactly one call to the Gemini
//! `generateContent` API and returns a uniform JSON result:
//!
//! - **Validation**: POST only, JSON body with a `message` of at least 3 characters
//! - **Fail-closed credential**: no upstream key configured means no outbound call
//! - **Error normalization**: provider failures pass through an ordered rule table
//! - **Metrics & Monitoring**: Prometheus metrics for observability
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging context, metrics, middleware)
//! - [`transformer`]: Provider wire format
//! - [`services`]: The relay, prompt construction and error classification
//! - [`api`]: HTTP handlers, router, models and upstream helpers
//!
//! # Configuration
//!
//! - `GEMINI_API_KEY`: upstream credential (requests fail with a configuration error without it)
//! - `GEMINI_API_BASE`: provider base URL (default: `https://generativelanguage.googleapis.com/v1beta`)
//! - `GEMINI_MODEL`: model identifier (default: `gemini-1.5-flash-latest`)
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `PORT`: Server port (default: 18000)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Upstream request timeout in seconds (default: 30)

pub mod api;
pub mod core;
pub mod services;
pub mod transformer;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState, RelayRequest, RelayResponse};
pub use core::{AppConfig, RelayConfig, RelayError, Result};
pub use services::Relay;
