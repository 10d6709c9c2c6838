//! Error types and handling for the relay.
//!
//! [`RelayError`] covers every terminal failure of a relay request and
//! implements HTTP response conversion into the `{ "error": ... }` shape the
//! chat UI renders.

use crate::core::error_types::ErrorKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Caller-visible text shared by configuration failures and unspecified
/// internal failures, so the two cannot be told apart from outside.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Erro interno do servidor";

/// Terminal failure of a single relay request.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Request used a verb other than POST
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Body missing, not JSON, or message too short
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream credential is not configured
    #[error("Configuration error: upstream API key is not set")]
    Configuration,

    /// Provider could not be reached (connect, DNS, timeout)
    #[error("Upstream unavailable (timed out: {timed_out}): {detail}")]
    UpstreamUnavailable { timed_out: bool, detail: String },

    /// Provider answered 429
    #[error("Upstream rate limit exceeded")]
    RateLimited,

    /// Provider rejected the configured credential
    #[error("Upstream rejected the API key")]
    Auth,

    /// Any other non-success provider status
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Success status with a body the relay cannot read an answer from
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// Anything else, including panics caught at the HTTP boundary
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            RelayError::InvalidInput(_) => ErrorKind::InvalidInput,
            RelayError::Configuration => ErrorKind::Configuration,
            RelayError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            RelayError::RateLimited => ErrorKind::RateLimited,
            RelayError::Auth => ErrorKind::Auth,
            RelayError::Upstream { .. } => ErrorKind::Upstream,
            RelayError::MalformedUpstreamResponse(_) => ErrorKind::MalformedUpstreamResponse,
            RelayError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::Auth => StatusCode::UNAUTHORIZED,
            // Only error statuses pass through; anything else from upstream is a 500
            RelayError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            RelayError::MalformedUpstreamResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Internal details (transport errors,
    /// malformed body descriptions) stay in the server log.
    pub fn client_message(&self) -> String {
        match self {
            RelayError::MethodNotAllowed(_) => "Método não permitido. Use POST.".to_string(),
            RelayError::InvalidInput(reason) => reason.clone(),
            RelayError::Configuration => GENERIC_INTERNAL_MESSAGE.to_string(),
            RelayError::UpstreamUnavailable { .. } => {
                "Erro de conexão com a API do Gemini. Tente novamente mais tarde.".to_string()
            }
            RelayError::RateLimited => {
                "Limite de requisições atingido. Tente novamente em alguns minutos.".to_string()
            }
            RelayError::Auth => "Erro de autenticação. A chave de API não é válida.".to_string(),
            RelayError::Upstream { status, message } => {
                format!("Erro na API do Gemini: {} {}", status, message)
            }
            RelayError::MalformedUpstreamResponse(_) => {
                "Resposta inválida da API do Gemini. Tente reformular sua pergunta."
                    .to_string()
            }
            RelayError::Internal(message) => {
                format!("{}: {}", GENERIC_INTERNAL_MESSAGE, message)
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let body = Json(json!({ "error": self.client_message() }));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}

/// Convenience type alias for Results using [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;
