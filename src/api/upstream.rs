//! Upstream request execution helpers.
//!
//! Builds the single outbound provider call and turns whatever comes back
//! into either a parsed success body or an [`UpstreamFault`] for the rule
//! table.

use crate::core::config::RelayConfig;
use crate::services::error_rules::UpstreamFault;
use crate::transformer::{GenerateContentRequest, MalformedReason};
use serde_json::Value;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Header carrying the provider credential. Keeping it out of the URL keeps
/// it out of reqwest error messages too.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

const REDACTED: &str = "[REDACTED]";

/// Build the provider request with the credential header and JSON body.
pub fn build_upstream_request(
    http_client: &reqwest::Client,
    config: &RelayConfig,
    api_key: &str,
    payload: &GenerateContentRequest,
) -> reqwest::RequestBuilder {
    http_client
        .post(config.generate_content_url())
        .header(API_KEY_HEADER, api_key)
        .json(payload)
}

/// Classify a reqwest transport error. The detail is for logs only.
pub fn transport_fault(error: &reqwest::Error) -> UpstreamFault {
    UpstreamFault::Transport {
        timed_out: error.is_timeout(),
        detail: error.to_string(),
    }
}

pub(crate) fn truncate_message(message: &str) -> String {
    let mut chars = message.chars();
    let truncated: String = chars.by_ref().take(MAX_ERROR_MESSAGE_LEN).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Replace every occurrence of the credential in `text`.
pub fn redact_credential(text: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        return text.to_string();
    }
    text.replace(api_key, REDACTED)
}

/// Extract canonical error message from provider error payload.
pub fn extract_error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.as_str())
                .map(|s| s.to_string())
        })
        .or_else(|| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
}

/// Collect `error.details[].reason` values (Google RPC `ErrorInfo`).
pub fn extract_error_reasons(body: &Value) -> Vec<String> {
    body.pointer("/error/details")
        .and_then(|d| d.as_array())
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d.get("reason").and_then(|r| r.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Read a non-2xx response into a status fault.
///
/// The message is taken from the JSON error body when present, otherwise from
/// the raw text; it is truncated and has the credential redacted.
pub async fn read_upstream_error(response: reqwest::Response, api_key: &str) -> UpstreamFault {
    let status = response.status().as_u16();

    let (parsed_body, raw_text) = match response.bytes().await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).to_string();
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            (body, text)
        }
        Err(error) => {
            tracing::debug!(error = %error, "Failed to read upstream error body");
            (None, String::new())
        }
    };

    let message = parsed_body
        .as_ref()
        .and_then(extract_error_message)
        .or_else(|| {
            let trimmed = raw_text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .map(|m| truncate_message(&redact_credential(&m, api_key)));

    let reasons = parsed_body
        .as_ref()
        .map(extract_error_reasons)
        .unwrap_or_default();

    UpstreamFault::Status {
        status,
        message,
        reasons,
    }
}

/// Read a 2xx response body as JSON.
pub async fn read_success_body(response: reqwest::Response) -> Result<Value, UpstreamFault> {
    let bytes = response
        .bytes()
        .await
        .map_err(|error| transport_fault(&error))?;

    serde_json::from_slice::<Value>(&bytes)
        .map_err(|error| UpstreamFault::Malformed(MalformedReason::InvalidJson(error.to_string())))
}
