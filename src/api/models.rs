//! API request and response models.
//!
//! Shapes exchanged with the chat UI. The relay reads the request body as
//! raw JSON so it can reject malformed input with its own message;
//! [`RelayRequest`] documents the expected shape.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Question sent by the chat UI.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"message": "Explique o handshake TCP"}))]
pub struct RelayRequest {
    /// User question; at least 3 characters after trimming
    pub message: String,
}

/// Successful relay result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[schema(example = json!({
    "response": "O handshake TCP (three-way handshake) estabelece uma conexão...",
    "model": "gemini-1.5-flash-latest",
    "timestamp": "2024-01-01T00:00:00.000Z"
}))]
pub struct RelayResponse {
    /// Answer text, trimmed (and framed when very short)
    pub response: String,

    /// Upstream model identifier used for the answer
    pub model: String,

    /// Completion instant of the upstream call, ISO-8601 UTC
    pub timestamp: String,
}

/// Error body for every failure path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"error": "Limite de requisições atingido. Tente novamente em alguns minutos."}))]
pub struct ErrorBody {
    pub error: String,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,

    /// Upstream model identifier the relay answers with
    pub model: String,
}
