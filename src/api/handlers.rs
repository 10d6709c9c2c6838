//! HTTP request handlers for the relay API.
//!
//! This module contains the relay endpoint plus health, metrics and
//! OpenAPI endpoints.

use crate::api::models::{ErrorBody, HealthResponse, RelayRequest, RelayResponse};
use crate::api::openapi::ApiDoc;
use crate::core::logging::get_request_id;
use crate::core::{RelayError, Result};
use crate::services::relay::INVALID_BODY;
use crate::services::Relay;
use axum::{
    extract::{rejection::BytesRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use utoipa::OpenApi;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}

/// Relay a question to the upstream provider.
///
/// Accepts any method so non-POST requests get a JSON 405 instead of the
/// router's empty one.
#[utoipa::path(
    post,
    path = "/api/gemini",
    tag = "relay",
    request_body = RelayRequest,
    responses(
        (status = 200, description = "Answer from the upstream model", body = RelayResponse),
        (status = 400, description = "Missing, malformed or too short message", body = ErrorBody),
        (status = 401, description = "Upstream rejected the relay's API key", body = ErrorBody),
        (status = 405, description = "Method other than POST", body = ErrorBody),
        (status = 429, description = "Upstream rate limit reached", body = ErrorBody),
        (status = 500, description = "Configuration, malformed upstream response or internal error", body = ErrorBody),
        (status = 503, description = "Upstream provider unreachable or timed out", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state, body), fields(request_id = %get_request_id()))]
pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) if method == Method::POST => {
            tracing::warn!(
                request_id = %get_request_id(),
                rejection = %rejection,
                "Failed to read request body"
            );
            return RelayError::InvalidInput(INVALID_BODY.to_string()).into_response();
        }
        Err(_) => Bytes::new(),
    };

    match state.relay.handle(&method, &body).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => {
            tracing::debug!(
                request_id = %get_request_id(),
                kind = %error.kind(),
                error = %error,
                "Relay request failed"
            );
            error.into_response()
        }
    }
}

/// Basic health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.relay.config().model.clone(),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| RelayError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}

/// OpenAPI document for the relay API.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
