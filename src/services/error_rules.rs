//! Ordered mapping from upstream faults to relay errors.
//!
//! Rules are evaluated top-down and the first match wins, so precedence is
//! the order of [`ERROR_RULES`].

use crate::core::error_types::{ErrorKind, PROVIDER_INVALID_KEY_MARKER};
use crate::core::RelayError;
use crate::transformer::MalformedReason;

/// Everything that can go wrong after the relay decides to call upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamFault {
    /// No HTTP response: connect/DNS failure, timeout, broken body stream
    Transport { timed_out: bool, detail: String },
    /// Non-2xx response. `message` is already truncated and redacted;
    /// `reasons` are the `error.details[].reason` values, if any.
    Status {
        status: u16,
        message: Option<String>,
        reasons: Vec<String>,
    },
    /// 2xx response without a usable answer
    Malformed(MalformedReason),
}

pub struct ErrorRule {
    pub name: &'static str,
    pub matches: fn(&UpstreamFault) -> bool,
    pub kind: ErrorKind,
}

pub const ERROR_RULES: &[ErrorRule] = &[
    ErrorRule {
        name: "transport",
        matches: is_transport,
        kind: ErrorKind::UpstreamUnavailable,
    },
    ErrorRule {
        name: "rate-limit",
        matches: is_rate_limited,
        kind: ErrorKind::RateLimited,
    },
    ErrorRule {
        name: "invalid-key",
        matches: is_invalid_key,
        kind: ErrorKind::Auth,
    },
    ErrorRule {
        name: "status",
        matches: is_error_status,
        kind: ErrorKind::Upstream,
    },
    ErrorRule {
        name: "malformed",
        matches: is_malformed,
        kind: ErrorKind::MalformedUpstreamResponse,
    },
];

fn is_transport(fault: &UpstreamFault) -> bool {
    matches!(fault, UpstreamFault::Transport { .. })
}

fn is_rate_limited(fault: &UpstreamFault) -> bool {
    matches!(fault, UpstreamFault::Status { status: 429, .. })
}

fn is_error_status(fault: &UpstreamFault) -> bool {
    matches!(fault, UpstreamFault::Status { status, .. } if !(200..300).contains(status))
}

fn is_malformed(fault: &UpstreamFault) -> bool {
    matches!(fault, UpstreamFault::Malformed(_))
}

fn is_invalid_key(fault: &UpstreamFault) -> bool {
    match fault {
        UpstreamFault::Status {
            status: 400,
            message,
            reasons,
        } => {
            message
                .as_deref()
                .is_some_and(|m| m.contains(PROVIDER_INVALID_KEY_MARKER))
                || reasons.iter().any(|r| r == PROVIDER_INVALID_KEY_MARKER)
        }
        _ => false,
    }
}

/// First matching rule for `fault`, if any.
pub fn classify(fault: &UpstreamFault) -> Option<&'static ErrorRule> {
    ERROR_RULES.iter().find(|rule| (rule.matches)(fault))
}

/// Convert a fault into the relay error the caller will see.
pub fn map_fault(fault: UpstreamFault) -> RelayError {
    let Some(rule) = classify(&fault) else {
        // A 2xx Status fault is never constructed by the relay.
        return RelayError::Internal(format!("unclassified upstream fault: {:?}", fault));
    };

    match (rule.kind, fault) {
        (ErrorKind::UpstreamUnavailable, UpstreamFault::Transport { timed_out, detail }) => {
            RelayError::UpstreamUnavailable { timed_out, detail }
        }
        (ErrorKind::RateLimited, _) => RelayError::RateLimited,
        (ErrorKind::Auth, _) => RelayError::Auth,
        (ErrorKind::Upstream, UpstreamFault::Status { status, message, .. }) => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .or_else(|| {
                    reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .map(|r| r.to_string())
                })
                .unwrap_or_else(|| "Erro desconhecido".to_string());
            RelayError::Upstream { status, message }
        }
        (ErrorKind::MalformedUpstreamResponse, UpstreamFault::Malformed(reason)) => {
            RelayError::MalformedUpstreamResponse(reason.to_string())
        }
        (kind, fault) => RelayError::Internal(format!(
            "rule {} ({}) does not apply to {:?}",
            rule.name, kind, fault
        )),
    }
}
