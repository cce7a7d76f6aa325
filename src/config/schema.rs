//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::proxy::{ExecutorLimits, ValidationPolicy, DEFAULT_USER_AGENT};
use crate::security::{DEFAULT_MAX_REQUEST_BYTES, DEFAULT_MAX_RESPONSE_BYTES};

/// Root configuration for the playground proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Proxy endpoint behaviour. Reloadable at runtime.
    pub proxy: ProxySettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// Settings of the proxy endpoint itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Route the proxy endpoint is mounted on.
    pub path: String,

    /// Deadline for the outbound call in seconds.
    pub timeout_secs: u64,

    /// Largest upstream body returned to the caller.
    pub max_response_bytes: usize,

    /// Largest inbound JSON body accepted.
    pub max_request_bytes: usize,

    /// User-Agent sent when the request has none.
    pub user_agent: String,

    /// Let requests reach loopback and private networks (local development).
    pub allow_private_addresses: bool,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            path: "/api/proxy".to_string(),
            timeout_secs: 30,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private_addresses: false,
        }
    }
}

impl ProxySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn limits(&self) -> ExecutorLimits {
        ExecutorLimits {
            timeout: self.timeout(),
            max_response_bytes: self.max_response_bytes,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            allow_private_addresses: self.allow_private_addresses,
        }
    }
}

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human oriented.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output style.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_limits() {
        let config = PlaygroundConfig::default();
        assert_eq!(config.proxy.timeout(), Duration::from_secs(30));
        assert_eq!(config.proxy.max_response_bytes, 1_048_576);
        assert_eq!(config.proxy.user_agent, "API-Response-Playground/1.0");
        assert_eq!(config.proxy.path, "/api/proxy");
        assert!(!config.proxy.allow_private_addresses);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config: PlaygroundConfig = toml::from_str("").unwrap();
        assert_eq!(config, PlaygroundConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: PlaygroundConfig = toml::from_str(
            r#"
            [proxy]
            timeout_secs = 5
            allow_private_addresses = true

            [observability]
            log_format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.proxy.timeout_secs, 5);
        assert!(config.proxy.allow_private_addresses);
        assert_eq!(config.proxy.max_response_bytes, DEFAULT_MAX_RESPONSE_BYTES);
        assert_eq!(config.observability.log_format, LogFormat::Compact);
        assert_eq!(config.listener, ListenerConfig::default());
    }

    #[test]
    fn settings_project_into_limits_and_policy() {
        let settings = ProxySettings {
            timeout_secs: 7,
            max_response_bytes: 10,
            user_agent: "ua".into(),
            allow_private_addresses: true,
            ..ProxySettings::default()
        };
        let limits = settings.limits();
        assert_eq!(limits.timeout, Duration::from_secs(7));
        assert_eq!(limits.max_response_bytes, 10);
        assert_eq!(limits.user_agent, "ua");
        assert!(settings.policy().allow_private_addresses);
    }
}
