//! Provider wire formats.
//!
//! The relay speaks a single upstream protocol, Gemini `generateContent`.

pub mod gemini;

pub use gemini::{
    extract_candidate_text, GenerateContentRequest, GenerationConfig, MalformedReason,
};
