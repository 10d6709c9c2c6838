//! Shared constants for relay error kinds and upstream outcome labels.

use std::fmt;

pub const ERROR_KIND_METHOD_NOT_ALLOWED: &str = "method-not-allowed";
pub const ERROR_KIND_INVALID_INPUT: &str = "invalid-input";
pub const ERROR_KIND_CONFIGURATION: &str = "configuration-error";
pub const ERROR_KIND_UPSTREAM_UNAVAILABLE: &str = "upstream-unavailable";
pub const ERROR_KIND_RATE_LIMITED: &str = "rate-limited";
pub const ERROR_KIND_AUTH: &str = "auth-error";
pub const ERROR_KIND_UPSTREAM: &str = "upstream-error";
pub const ERROR_KIND_MALFORMED_UPSTREAM_RESPONSE: &str = "malformed-upstream-response";
pub const ERROR_KIND_INTERNAL: &str = "internal-error";

pub const UPSTREAM_OUTCOME_SUCCESS: &str = "success";
pub const UPSTREAM_OUTCOME_TIMEOUT: &str = "timeout";
pub const UPSTREAM_OUTCOME_TRANSPORT: &str = "transport";
pub const UPSTREAM_OUTCOME_STATUS: &str = "status";
pub const UPSTREAM_OUTCOME_MALFORMED: &str = "malformed";

/// Provider error marker for a rejected credential.
pub const PROVIDER_INVALID_KEY_MARKER: &str = "API_KEY_INVALID";

/// Caller-visible error category. Never serialized to the client; attached
/// to responses as an extension for metrics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MethodNotAllowed,
    InvalidInput,
    Configuration,
    UpstreamUnavailable,
    RateLimited,
    Auth,
    Upstream,
    MalformedUpstreamResponse,
    Internal,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MethodNotAllowed => ERROR_KIND_METHOD_NOT_ALLOWED,
            Self::InvalidInput => ERROR_KIND_INVALID_INPUT,
            Self::Configuration => ERROR_KIND_CONFIGURATION,
            Self::UpstreamUnavailable => ERROR_KIND_UPSTREAM_UNAVAILABLE,
            Self::RateLimited => ERROR_KIND_RATE_LIMITED,
            Self::Auth => ERROR_KIND_AUTH,
            Self::Upstream => ERROR_KIND_UPSTREAM,
            Self::MalformedUpstreamResponse => ERROR_KIND_MALFORMED_UPSTREAM_RESPONSE,
            Self::Internal => ERROR_KIND_INTERNAL,
        }
    }

    /// Whether the caller may reasonably retry after a delay.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::UpstreamUnavailable | Self::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::MethodNotAllowed.as_str(), "method-not-allowed");
        assert_eq!(
            ErrorKind::MalformedUpstreamResponse.to_string(),
            "malformed-upstream-response"
        );
        assert_eq!(ErrorKind::Internal.to_string(), "internal-error");
    }

    #[test]
    fn test_transient_kinds() {
        assert!(ErrorKind::UpstreamUnavailable.is_transient());
        assert!(ErrorKind::RateLimited.is_transient());
        assert!(!ErrorKind::Auth.is_transient());
        assert!(!ErrorKind::InvalidInput.is_transient());
    }
}
