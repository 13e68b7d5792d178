//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! The intake is generic over its authenticator and registrar; AppState pins it
//! to boxed ports so the registrar backend can be picked from config at runtime.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use hookport_core::auth::authenticator::BoxApiAuthenticator;
use hookport_core::membership::service::MembershipService;
use hookport_core::registration::intake::RegistrationIntake;
use hookport_core::registration::registrar::BoxTriggerRegistrar;
use hookport_infra::config::{load_server_config, resolve_data_dir};
use hookport_infra::remote::registrar::HttpTriggerRegistrar;
use hookport_infra::sqlite::api_key::SqliteApiKeyRepository;
use hookport_infra::sqlite::membership::SqliteMembershipRepository;
use hookport_infra::sqlite::pool::{DatabasePool, database_url};
use hookport_infra::sqlite::registration::SqliteTriggerRegistrar;
use hookport_infra::sqlite::tenant::SqliteTenantRepository;
use hookport_types::config::{RegistrarBackend, ServerConfig};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteIntake = RegistrationIntake<BoxApiAuthenticator, BoxTriggerRegistrar>;

pub type ConcreteMembershipService = MembershipService<SqliteMembershipRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<ConcreteIntake>,
    pub membership_service: Arc<ConcreteMembershipService>,
    pub tenants: Arc<SqliteTenantRepository>,
    pub api_keys: SqliteApiKeyRepository,
    pub config: ServerConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state from the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_server_config(&data_dir).await;
        Self::open(data_dir, config).await
    }

    /// Connect to the database in `data_dir` and wire services per `config`.
    pub async fn open(data_dir: PathBuf, config: ServerConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open database")?;

        let api_keys = SqliteApiKeyRepository::new(db_pool.clone());
        let registrar = build_registrar(&config, &db_pool)?;
        let intake = RegistrationIntake::new(BoxApiAuthenticator::new(api_keys.clone()), registrar);

        let membership_service =
            MembershipService::new(SqliteMembershipRepository::new(db_pool.clone()));

        tracing::debug!(
            data_dir = %data_dir.display(),
            backend = ?config.registrar.backend,
            "application state ready"
        );

        Ok(Self {
            intake: Arc::new(intake),
            membership_service: Arc::new(membership_service),
            tenants: Arc::new(SqliteTenantRepository::new(db_pool.clone())),
            api_keys,
            config,
            data_dir,
        })
    }
}

/// Pick the registrar backend named in config.
fn build_registrar(
    config: &ServerConfig,
    db_pool: &DatabasePool,
) -> anyhow::Result<BoxTriggerRegistrar> {
    match config.registrar.backend {
        RegistrarBackend::Sqlite => Ok(BoxTriggerRegistrar::new(SqliteTriggerRegistrar::new(
            db_pool.clone(),
        ))),
        RegistrarBackend::Http => {
            let base_url = config
                .registrar
                .base_url
                .as_deref()
                .context("registrar.base_url is required when registrar.backend = \"http\"")?;
            let registrar = HttpTriggerRegistrar::new(
                base_url,
                Duration::from_secs(config.registrar.timeout_secs),
            )?;
            Ok(BoxTriggerRegistrar::new(registrar))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_database_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested");

        AppState::open(data_dir.clone(), ServerConfig::default())
            .await
            .unwrap();
        assert!(data_dir.join("hookport.db").exists());
    }

    #[tokio::test]
    async fn http_backend_requires_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.registrar.backend = RegistrarBackend::Http;

        let err = AppState::open(dir.path().to_path_buf(), config.clone())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("base_url"));

        config.registrar.base_url = Some("http://127.0.0.1:9".to_string());
        assert!(AppState::open(dir.path().to_path_buf(), config).await.is_ok());
    }
}
