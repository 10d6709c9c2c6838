//! Gemini `generateContent` wire format.
//!
//! Only the pieces the relay needs: a single-part text request with a fixed
//! generation config, and extraction of `candidates[0].content.parts[0].text`
//! from the response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const TEMPERATURE: f64 = 0.3;
pub const TOP_P: f64 = 0.8;
pub const TOP_K: u32 = 40;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

/// Sampling settings: low temperature, bounded length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerateContentRequest {
    /// Wrap a prompt as a single user turn with the fixed generation config.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

/// Why a success-status body could not yield an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Body is not valid JSON
    InvalidJson(String),
    /// `candidates` absent or not an array; carries `promptFeedback.blockReason` if any
    MissingCandidates(Option<String>),
    /// `candidates` present but empty
    EmptyCandidates(Option<String>),
    /// First candidate has no `content.parts[0].text` string; carries its `finishReason`
    MissingText(Option<String>),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::InvalidJson(error) => {
                write!(f, "response is not valid JSON: {}", error)
            }
            MalformedReason::MissingCandidates(block) => {
                write!(f, "response has no candidates array")?;
                write_suffix(f, "blockReason", block)
            }
            MalformedReason::EmptyCandidates(block) => {
                write!(f, "response has zero candidates")?;
                write_suffix(f, "blockReason", block)
            }
            MalformedReason::MissingText(finish) => {
                write!(f, "first candidate has no text part")?;
                write_suffix(f, "finishReason", finish)
            }
        }
    }
}

fn write_suffix(f: &mut fmt::Formatter<'_>, label: &str, value: &Option<String>) -> fmt::Result {
    match value {
        Some(v) => write!(f, " ({}={})", label, v),
        None => Ok(()),
    }
}

/// Read `candidates[0].content.parts[0].text` from a provider response.
pub fn extract_candidate_text(body: &Value) -> Result<&str, MalformedReason> {
    let block_reason = || {
        body.pointer("/promptFeedback/blockReason")
            .and_then(|r| r.as_str())
            .map(|s| s.to_string())
    };

    let candidates = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| MalformedReason::MissingCandidates(block_reason()))?;

    let first = candidates
        .first()
        .ok_or_else(|| MalformedReason::EmptyCandidates(block_reason()))?;

    first
        .pointer("/content/parts/0/text")
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            MalformedReason::MissingText(
                first
                    .get("finishReason")
                    .and_then(|r| r.as_str())
                    .map(|s| s.to_string()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest::from_prompt("hello");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [{"text": "hello"}]}],
                "generationConfig": {
                    "temperature": 0.3,
                    "topP": 0.8,
                    "topK": 40,
                    "maxOutputTokens": 2048
                }
            })
        );
    }

    #[test]
    fn test_extract_text() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"text": "answer"}], "role": "model"},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_candidate_text(&body), Ok("answer"));
    }

    #[test]
    fn test_extract_uses_first_candidate_only() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}]}},
                {"content": {"parts": [{"text": "second"}]}}
            ]
        });
        assert_eq!(extract_candidate_text(&body), Ok("first"));
    }

    #[test]
    fn test_missing_candidates_reports_block_reason() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = extract_candidate_text(&body).unwrap_err();
        assert_eq!(
            err,
            MalformedReason::MissingCandidates(Some("SAFETY".to_string()))
        );
        assert_eq!(
            err.to_string(),
            "response has no candidates array (blockReason=SAFETY)"
        );
    }

    #[test]
    fn test_empty_candidates() {
        let body = json!({"candidates": []});
        assert_eq!(
            extract_candidate_text(&body),
            Err(MalformedReason::EmptyCandidates(None))
        );
    }

    #[test]
    fn test_candidate_without_text() {
        let body = json!({"candidates": [{"finishReason": "MAX_TOKENS", "content": {"parts": []}}]});
        assert_eq!(
            extract_candidate_text(&body),
            Err(MalformedReason::MissingText(Some("MAX_TOKENS".to_string())))
        );
    }

    #[test]
    fn test_candidates_not_an_array() {
        let body = json!({"candidates": "nope"});
        assert!(matches!(
            extract_candidate_text(&body),
            Err(MalformedReason::MissingCandidates(None))
        ));
    }
}
