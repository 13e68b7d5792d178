//! SQLite API key store and authenticator.
//!
//! Keys are SHA-256 hashed and compared against the `api_keys` table, joined
//! to the environment they were minted for.

use chrono::Utc;
use secrecy::SecretString;
use sqlx::Row;
use uuid::Uuid;

use hookport_core::auth::authenticator::ApiAuthenticator;
use hookport_types::environment::{AuthenticatedEnvironment, EnvironmentId};
use hookport_types::error::RepositoryError;
use hookport_types::organization::OrganizationId;

use super::pool::DatabasePool;
use super::{parse_uuid, query_error};
use crate::crypto::hash::hash_api_key;
use crate::crypto::token::generate_api_key;

/// SQLite-backed implementation of `ApiAuthenticator`.
#[derive(Clone)]
pub struct SqliteApiKeyRepository {
    pool: DatabasePool,
}

impl SqliteApiKeyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Mint a new key for `environment` and store its hash.
    ///
    /// Returns the key id and the plaintext key. The plaintext is never
    /// stored and cannot be recovered later.
    pub async fn create_api_key(
        &self,
        environment: &AuthenticatedEnvironment,
        name: &str,
    ) -> Result<(Uuid, SecretString), RepositoryError> {
        let plaintext = generate_api_key(environment.kind);
        let id = Uuid::now_v7();

        sqlx::query(
            "INSERT INTO api_keys (id, environment_id, key_hash, name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(environment.id.to_string())
        .bind(hash_api_key(&plaintext))
        .bind(name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        tracing::info!(key_id = %id, environment_id = %environment.id, "API key created");

        Ok((id, SecretString::from(plaintext)))
    }

    /// Revoke a key. Revoked keys no longer authenticate.
    pub async fn revoke_api_key(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE api_keys SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

impl ApiAuthenticator for SqliteApiKeyRepository {
    async fn authenticate(
        &self,
        api_key: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, RepositoryError> {
        let key_hash = hash_api_key(api_key.trim());

        let row = sqlx::query(
            "SELECT k.id AS key_id, e.id AS environment_id, e.slug, e.kind, e.organization_id
             FROM api_keys k
             JOIN environments e ON e.id = k.environment_id
             WHERE k.key_hash = ? AND k.revoked_at IS NULL",
        )
        .bind(&key_hash)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let key_id: String = row.try_get("key_id").map_err(query_error)?;
        let environment_id: String = row.try_get("environment_id").map_err(query_error)?;
        let organization_id: String = row.try_get("organization_id").map_err(query_error)?;
        let kind: String = row.try_get("kind").map_err(query_error)?;

        let environment = AuthenticatedEnvironment {
            id: EnvironmentId::from_uuid(parse_uuid(&environment_id)?),
            slug: row.try_get("slug").map_err(query_error)?,
            kind: kind.parse().map_err(RepositoryError::Query)?,
            organization_id: OrganizationId::from_uuid(parse_uuid(&organization_id)?),
        };

        // Best effort; a failed timestamp update must not fail the request.
        if let Err(e) = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(&key_id)
            .execute(&self.pool.writer)
            .await
        {
            tracing::warn!(key_id = %key_id, error = %e, "failed to record API key usage");
        }

        Ok(Some(environment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookport_types::environment::EnvironmentKind;
    use secrecy::ExposeSecret;

    use crate::sqlite::pool::test_pool;
    use crate::sqlite::tenant::SqliteTenantRepository;

    async fn seeded(dir: &tempfile::TempDir) -> (SqliteApiKeyRepository, AuthenticatedEnvironment) {
        let pool = test_pool(dir).await;
        let tenants = SqliteTenantRepository::new(pool.clone());
        let org = tenants.create_organization("acme", "Acme").await.unwrap();
        let env = tenants
            .create_environment(&org.id, "dev", EnvironmentKind::Development)
            .await
            .unwrap();
        (SqliteApiKeyRepository::new(pool), env)
    }

    #[tokio::test]
    async fn test_created_key_authenticates_to_its_environment() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, env) = seeded(&dir).await;

        let (_, key) = repo.create_api_key(&env, "default").await.unwrap();
        assert!(key.expose_secret().starts_with("hp_dev_"));

        let resolved = repo.authenticate(key.expose_secret()).await.unwrap().unwrap();
        assert_eq!(resolved, env);
    }

    #[tokio::test]
    async fn test_unknown_key_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, _) = seeded(&dir).await;

        assert!(repo.authenticate("hp_dev_nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_only_hash_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, env) = seeded(&dir).await;
        let (_, key) = repo.create_api_key(&env, "default").await.unwrap();

        let stored: (String,) = sqlx::query_as("SELECT key_hash FROM api_keys")
            .fetch_one(&repo.pool.reader)
            .await
            .unwrap();
        assert_ne!(stored.0, key.expose_secret());
        assert_eq!(stored.0, hash_api_key(key.expose_secret()));
    }

    #[tokio::test]
    async fn test_revoked_key_no_longer_authenticates() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, env) = seeded(&dir).await;
        let (id, key) = repo.create_api_key(&env, "default").await.unwrap();

        repo.revoke_api_key(&id).await.unwrap();
        assert!(repo.authenticate(key.expose_secret()).await.unwrap().is_none());

        let err = repo.revoke_api_key(&id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_authentication_records_last_used() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, env) = seeded(&dir).await;
        let (_, key) = repo.create_api_key(&env, "default").await.unwrap();

        repo.authenticate(key.expose_secret()).await.unwrap();

        let last_used: (Option<String>,) = sqlx::query_as("SELECT last_used_at FROM api_keys")
            .fetch_one(&repo.pool.writer)
            .await
            .unwrap();
        assert!(last_used.0.is_some());
    }
}
