//! Configuration loader for Hookport.
//!
//! Reads `config.toml` from the data directory (`~/.hookport/` by default)
//! and deserializes it into [`ServerConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use hookport_types::config::ServerConfig;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `HOOKPORT_DATA_DIR` environment variable
/// 2. `~/.hookport`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HOOKPORT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".hookport");
    }

    PathBuf::from(".hookport")
}

/// Load server configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`ServerConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_server_config(data_dir: &Path) -> ServerConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookport_types::config::RegistrarBackend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_server_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.registrar.backend, RegistrarBackend::Sqlite);
    }

    #[tokio::test]
    async fn load_server_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
port = 8080

[registrar]
backend = "http"
base_url = "http://registry.internal"
timeout_secs = 3
"#,
        )
        .await
        .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.registrar.backend, RegistrarBackend::Http);
        assert_eq!(config.registrar.base_url.as_deref(), Some("http://registry.internal"));
        assert_eq!(config.registrar.timeout_secs, 3);
    }

    #[tokio::test]
    async fn load_server_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.server.port, 3030);
        assert!(config.registrar.base_url.is_none());
    }
}
