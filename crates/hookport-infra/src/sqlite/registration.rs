//! SQLite trigger registrar.
//!
//! Registrations are upserted on (environment, endpoint, trigger id, key).
//! A repeat registration replaces the stored source description and
//! reactivates the row, keeping its id, signing secret and creation time.

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use hookport_core::registration::registrar::TriggerRegistrar;
use hookport_types::environment::AuthenticatedEnvironment;
use hookport_types::error::RegistrationError;
use hookport_types::trigger::{RegisterTriggerBody, RegistrationPath, TriggerRegistration};

use super::parse_datetime;
use super::pool::DatabasePool;
use crate::crypto::token::generate_signing_secret;

/// SQLite-backed implementation of `TriggerRegistrar`.
pub struct SqliteTriggerRegistrar {
    pool: DatabasePool,
}

impl SqliteTriggerRegistrar {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn unexpected(e: impl std::fmt::Display) -> RegistrationError {
    RegistrationError::Unexpected(e.to_string())
}

impl TriggerRegistrar for SqliteTriggerRegistrar {
    async fn register(
        &self,
        environment: &AuthenticatedEnvironment,
        payload: RegisterTriggerBody,
        path: &RegistrationPath,
    ) -> Result<TriggerRegistration, RegistrationError> {
        let environment_id = environment.id.to_string();

        let endpoint_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM endpoints WHERE environment_id = ? AND slug = ?")
                .bind(&environment_id)
                .bind(&path.endpoint_slug)
                .fetch_optional(&self.pool.writer)
                .await
                .map_err(unexpected)?;

        let Some(endpoint_id) = endpoint_id else {
            return Err(RegistrationError::Rejected("Endpoint not found".to_string()));
        };

        let source = serde_json::to_string(&payload).map_err(unexpected)?;
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query(
            "INSERT INTO trigger_registrations
                (id, environment_id, endpoint_id, trigger_id, key, source, secret, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
             ON CONFLICT(environment_id, endpoint_id, trigger_id, key) DO UPDATE SET
                source = excluded.source,
                active = 1,
                updated_at = excluded.updated_at
             RETURNING id, secret, active, created_at, updated_at",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(&environment_id)
        .bind(&endpoint_id)
        .bind(&path.id)
        .bind(&path.key)
        .bind(&source)
        .bind(generate_signing_secret())
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(unexpected)?;

        let id: String = row.try_get("id").map_err(unexpected)?;
        let created_at: String = row.try_get("created_at").map_err(unexpected)?;
        let updated_at: String = row.try_get("updated_at").map_err(unexpected)?;

        let registration = TriggerRegistration {
            id: Uuid::parse_str(&id).map_err(unexpected)?,
            environment_id: environment.id.clone(),
            endpoint_slug: path.endpoint_slug.clone(),
            trigger_id: path.id.clone(),
            key: path.key.clone(),
            source: payload,
            secret: row.try_get("secret").map_err(unexpected)?,
            active: row.try_get("active").map_err(unexpected)?,
            created_at: parse_datetime(&created_at).map_err(unexpected)?,
            updated_at: parse_datetime(&updated_at).map_err(unexpected)?,
        };

        tracing::debug!(
            registration_id = %registration.id,
            endpoint_id = %endpoint_id,
            "registration stored"
        );

        Ok(registration)
    }
}
