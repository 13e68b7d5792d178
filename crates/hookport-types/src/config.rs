//! Configuration types for Hookport.
//!
//! `ServerConfig` represents the top-level `config.toml` that controls the
//! listen address and which registration backend the intake dispatches to.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Hookport service.
///
/// Loaded from `~/.hookport/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub registrar: RegistrarConfig,
}

/// Address the REST API binds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where validated registrations are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrarBackend {
    /// Registrations are upserted into the local SQLite database.
    #[default]
    Sqlite,
    /// Registrations are forwarded to a remote registration service.
    Http,
}

/// Registration backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    #[serde(default)]
    pub backend: RegistrarBackend,

    /// Base URL of the remote registration service (required for `http`).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout for the remote registration service.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            backend: RegistrarBackend::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default_values() {
        let config = ServerConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.registrar.backend, RegistrarBackend::Sqlite);
        assert_eq!(config.registrar.timeout_secs, 10);
        assert!(config.registrar.base_url.is_none());
    }

    #[test]
    fn test_server_config_from_toml() {
        let toml_str = r#"
[server]
port = 8080

[registrar]
backend = "http"
base_url = "https://registry.internal"
"#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.registrar.backend, RegistrarBackend::Http);
        assert_eq!(
            config.registrar.base_url.as_deref(),
            Some("https://registry.internal")
        );
        assert_eq!(config.registrar.timeout_secs, 10);
    }

    #[test]
    fn test_server_config_empty_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.registrar.backend, RegistrarBackend::Sqlite);
    }
}
