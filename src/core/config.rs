//! Configuration management for the relay.
//!
//! Configuration is read once from the process environment (optionally
//! seeded from a `.env` file) into a typed [`AppConfig`] that is passed
//! explicitly to the relay. Nothing reads the environment after startup.

use anyhow::{Context, Result};
use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration (host, port)
    pub server: ServerConfig,

    /// Upstream provider settings used by the relay
    pub relay: RelayConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream provider settings.
#[derive(Clone)]
pub struct RelayConfig {
    /// Provider credential. `None` makes every relay request fail closed.
    pub api_key: Option<String>,

    /// Base URL of the provider API (no trailing slash)
    pub api_base: String,

    /// Model identifier used for generation and reported to the caller
    pub model: String,

    /// Bound on the single outbound call, in seconds
    pub request_timeout_secs: u64,

    /// Whether to verify SSL certificates for upstream requests
    pub verify_ssl: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: default_request_timeout(),
            verify_ssl: true,
        }
    }
}

// Keeps the credential out of `{:?}` output.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl RelayConfig {
    /// Create a config for the given credential with default provider settings.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: normalize_secret(Some(api_key.into())),
            ..Self::default()
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL of the provider's text-generation endpoint.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    18000
}

fn default_request_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `GEMINI_API_KEY`, `GEMINI_API_BASE`,
    /// `GEMINI_MODEL`, `REQUEST_TIMEOUT_SECS`, `VERIFY_SSL`, `HOST`, `PORT`.
    /// A missing credential is not an error here; the relay reports it per
    /// request instead.
    pub fn from_env() -> Result<Self> {
        let mut server = ServerConfig::default();
        let mut relay = RelayConfig::default();

        if let Ok(host) = std::env::var("HOST") {
            server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            server.port = port_str
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port_str))?;
        }

        relay.api_key = normalize_secret(std::env::var("GEMINI_API_KEY").ok());

        if let Ok(api_base) = std::env::var("GEMINI_API_BASE") {
            if !api_base.trim().is_empty() {
                relay.api_base = api_base.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                relay.model = model.trim().to_string();
            }
        }

        if let Ok(timeout_str) = std::env::var("REQUEST_TIMEOUT_SECS") {
            let timeout = timeout_str
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid REQUEST_TIMEOUT_SECS value: {}", timeout_str))?;
            if timeout == 0 {
                anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
            }
            relay.request_timeout_secs = timeout;
        }

        if let Ok(verify_ssl_str) = std::env::var("VERIFY_SSL") {
            relay.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        Ok(Self { server, relay })
    }
}

/// Treat blank secrets as absent.
fn normalize_secret(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "GEMINI_API_KEY",
        "GEMINI_API_BASE",
        "GEMINI_MODEL",
        "REQUEST_TIMEOUT_SECS",
        "VERIFY_SSL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();
        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 18000);
        assert!(config.relay.api_key.is_none());
        assert_eq!(config.relay.api_base, DEFAULT_API_BASE);
        assert_eq!(config.relay.model, DEFAULT_MODEL);
        assert_eq!(config.relay.request_timeout_secs, 30);
        assert!(config.relay.verify_ssl);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("PORT", "9000");
        std::env::set_var("GEMINI_API_KEY", "  secret-key  ");
        std::env::set_var("GEMINI_API_BASE", "http://localhost:1234/v1beta/");
        std::env::set_var("GEMINI_MODEL", "gemini-test");
        std::env::set_var("REQUEST_TIMEOUT_SECS", "12");
        std::env::set_var("VERIFY_SSL", "off");

        let config = AppConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.relay.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.relay.api_base, "http://localhost:1234/v1beta");
        assert_eq!(config.relay.model, "gemini-test");
        assert_eq!(config.relay.request_timeout_secs, 12);
        assert!(!config.relay.verify_ssl);
    }

    #[test]
    #[serial]
    fn test_blank_api_key_is_absent() {
        clear_env();
        std::env::set_var("GEMINI_API_KEY", "   ");
        let config = AppConfig::from_env().unwrap();
        clear_env();

        assert!(!config.relay.has_credential());
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_rejected() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        assert!(AppConfig::from_env().is_err());

        clear_env();
        std::env::set_var("REQUEST_TIMEOUT_SECS", "0");
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_generate_content_url() {
        let mut relay = RelayConfig::with_api_key("k");
        relay.api_base = "http://127.0.0.1:8080/v1beta/".to_string();
        relay.model = "gemini-x".to_string();
        assert_eq!(
            relay.generate_content_url(),
            "http://127.0.0.1:8080/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let relay = RelayConfig::with_api_key("super-secret-value");
        let debug = format!("{:?}", relay);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_str_to_bool() {
        assert!(str_to_bool("true"));
        assert!(str_to_bool("YES"));
        assert!(str_to_bool("1"));
        assert!(!str_to_bool("false"));
        assert!(!str_to_bool("0"));
    }
}
