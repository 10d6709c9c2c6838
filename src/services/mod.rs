//! Business logic services for the relay.
//!
//! This module contains the relay itself, prompt construction, and the
//! ordered upstream error rule table.

pub mod error_rules;
pub mod prompt;
pub mod relay;

// Re-export commonly used types
pub use error_rules::{classify, map_fault, UpstreamFault, ERROR_RULES};
pub use prompt::{build_prompt, format_answer};
pub use relay::{validate_request, Relay};
