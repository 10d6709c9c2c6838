//! The message relay.
//!
//! One inbound question becomes at most one outbound provider call:
//!
//! ```text
//! Received -> Validated -> (Configured | ConfigError)
//!          -> UpstreamCalled -> (Success | MappedError)
//!          \-> ValidationError
//! ```
//!
//! Nothing survives a request: no cache, no session, no retry.

use crate::api::models::RelayResponse;
use crate::api::upstream::{
    build_upstream_request, read_success_body, read_upstream_error, transport_fault,
};
use crate::core::cancel::UpstreamCallGuard;
use crate::core::config::RelayConfig;
use crate::core::error_types::{
    UPSTREAM_OUTCOME_MALFORMED, UPSTREAM_OUTCOME_STATUS, UPSTREAM_OUTCOME_SUCCESS,
    UPSTREAM_OUTCOME_TIMEOUT, UPSTREAM_OUTCOME_TRANSPORT,
};
use crate::core::logging::get_request_id;
use crate::core::metrics::record_upstream_call;
use crate::core::{RelayError, Result};
use crate::services::error_rules::{map_fault, UpstreamFault};
use crate::services::prompt::{build_prompt, format_answer};
use crate::transformer::{extract_candidate_text, GenerateContentRequest};
use axum::http::Method;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::time::Duration;

/// Minimum trimmed message length, in characters.
pub const MIN_MESSAGE_CHARS: usize = 3;

pub const INVALID_MESSAGE: &str =
    "Mensagem inválida. Forneça uma pergunta com pelo menos 3 caracteres.";
pub const INVALID_BODY: &str =
    "Corpo da requisição inválido. Envie um objeto JSON com o campo \"message\" em texto.";

#[derive(Clone)]
pub struct Relay {
    config: RelayConfig,
    http_client: reqwest::Client,
}

impl Relay {
    pub fn new(config: RelayConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build a relay with its own pooled client bounded by the configured timeout.
    pub fn from_config(config: RelayConfig) -> anyhow::Result<Self> {
        let http_client = create_http_client(&config)?;
        Ok(Self::new(config, http_client))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Relay one question. Returns the success body or the terminal error.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> Result<RelayResponse> {
        let message = validate_request(method, body)?;

        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::error!(
                request_id = %get_request_id(),
                "Upstream API key is not configured; refusing request"
            );
            return Err(RelayError::Configuration);
        };

        let prompt = build_prompt(&message);
        tracing::debug!(
            request_id = %get_request_id(),
            model = %self.config.model,
            message_chars = message.chars().count(),
            prompt_chars = prompt.chars().count(),
            "Forwarding question to upstream provider"
        );

        let text = self.call_upstream(api_key, prompt).await?;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        Ok(RelayResponse {
            response: format_answer(&text),
            model: self.config.model.clone(),
            timestamp,
        })
    }

    /// Issue exactly one provider call and return the first candidate's text.
    async fn call_upstream(&self, api_key: &str, prompt: String) -> Result<String> {
        let request_id = get_request_id();
        let mut guard = UpstreamCallGuard::new(request_id.clone(), self.config.model.clone());

        let payload = GenerateContentRequest::from_prompt(prompt);
        let request = build_upstream_request(&self.http_client, &self.config, api_key, &payload);
        let result = execute(request, api_key).await;

        guard.mark_completed();
        let elapsed = guard.elapsed_secs();

        match result {
            Ok(text) => {
                record_upstream_call(&self.config.model, UPSTREAM_OUTCOME_SUCCESS, elapsed);
                tracing::debug!(
                    request_id = %request_id,
                    answer_chars = text.chars().count(),
                    elapsed_secs = elapsed,
                    "Upstream call succeeded"
                );
                Ok(text)
            }
            Err(fault) => {
                record_upstream_call(&self.config.model, fault_outcome(&fault), elapsed);
                log_fault(&request_id, &fault, elapsed);
                Err(map_fault(fault))
            }
        }
    }
}

/// Check method, body shape and message length; return the trimmed message.
pub fn validate_request(method: &Method, body: &[u8]) -> Result<String> {
    if *method != Method::POST {
        return Err(RelayError::MethodNotAllowed(method.to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| RelayError::InvalidInput(INVALID_BODY.to_string()))?;

    let message = value
        .get("message")
        .and_then(|m| m.as_str())
        .ok_or_else(|| RelayError::InvalidInput(INVALID_MESSAGE.to_string()))?
        .trim();

    if message.chars().count() < MIN_MESSAGE_CHARS {
        return Err(RelayError::InvalidInput(INVALID_MESSAGE.to_string()));
    }

    Ok(message.to_string())
}

async fn execute(
    request: reqwest::RequestBuilder,
    api_key: &str,
) -> std::result::Result<String, UpstreamFault> {
    let response = request.send().await.map_err(|e| transport_fault(&e))?;

    if !response.status().is_success() {
        return Err(read_upstream_error(response, api_key).await);
    }

    let body = read_success_body(response).await?;
    extract_candidate_text(&body)
        .map(|text| text.to_string())
        .map_err(UpstreamFault::Malformed)
}

fn fault_outcome(fault: &UpstreamFault) -> &'static str {
    match fault {
        UpstreamFault::Transport {
            timed_out: true, ..
        } => UPSTREAM_OUTCOME_TIMEOUT,
        UpstreamFault::Transport { .. } => UPSTREAM_OUTCOME_TRANSPORT,
        UpstreamFault::Status { .. } => UPSTREAM_OUTCOME_STATUS,
        UpstreamFault::Malformed(_) => UPSTREAM_OUTCOME_MALFORMED,
    }
}

fn log_fault(request_id: &str, fault: &UpstreamFault, elapsed: f64) {
    match fault {
        UpstreamFault::Transport { timed_out, detail } => tracing::error!(
            request_id = %request_id,
            is_timeout = timed_out,
            error = %detail,
            elapsed_secs = elapsed,
            "HTTP request failed to upstream provider"
        ),
        UpstreamFault::Status {
            status,
            message,
            reasons,
        } => tracing::error!(
            request_id = %request_id,
            status = status,
            error_message = ?message,
            reasons = ?reasons,
            elapsed_secs = elapsed,
            "Upstream provider returned an error status"
        ),
        UpstreamFault::Malformed(reason) => tracing::error!(
            request_id = %request_id,
            reason = %reason,
            elapsed_secs = elapsed,
            "Upstream provider returned an unusable response"
        ),
    }
}

/// Create HTTP client with connection pooling and a bounded request timeout.
pub fn create_http_client(config: &RelayConfig) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
        .pool_max_idle_per_host(32)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;
    Ok(client)
}
