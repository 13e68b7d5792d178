//! SQLite tenant administration: organizations, users, environments and
//! endpoints. Used by the CLI to provision what the intake authenticates
//! against and registers into.

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use hookport_types::environment::{AuthenticatedEnvironment, EnvironmentId, EnvironmentKind};
use hookport_types::error::RepositoryError;
use hookport_types::organization::{MemberRole, Organization, OrganizationId, UserSummary};

use super::pool::DatabasePool;
use super::{parse_datetime, parse_uuid, query_error};

/// SQLite-backed tenant administration.
pub struct SqliteTenantRepository {
    pool: DatabasePool,
}

/// Map unique-constraint violations to `Conflict`, everything else to `Query`.
fn write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("{what} already exists"))
        }
        _ => query_error(e),
    }
}

impl SqliteTenantRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub async fn create_organization(
        &self,
        slug: &str,
        title: &str,
    ) -> Result<Organization, RepositoryError> {
        let org = Organization {
            id: OrganizationId::new(),
            slug: slug.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO organizations (id, slug, title, created_at) VALUES (?, ?, ?, ?)")
            .bind(org.id.to_string())
            .bind(&org.slug)
            .bind(&org.title)
            .bind(org.created_at.to_rfc3339())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| write_error(e, &format!("organization '{slug}'")))?;

        Ok(org)
    }

    pub async fn find_organization(
        &self,
        slug: &str,
    ) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query("SELECT id, slug, title, created_at FROM organizations WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id").map_err(query_error)?;
                let created_at: String = row.try_get("created_at").map_err(query_error)?;
                Ok(Some(Organization {
                    id: OrganizationId::from_uuid(parse_uuid(&id)?),
                    slug: row.try_get("slug").map_err(query_error)?,
                    title: row.try_get("title").map_err(query_error)?,
                    created_at: parse_datetime(&created_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<UserSummary, RepositoryError> {
        let user = UserSummary {
            id: Uuid::now_v7(),
            name: name.map(str::to_string),
            email: email.trim().to_lowercase(),
            avatar_url: None,
        };

        sqlx::query("INSERT INTO users (id, email, name, avatar_url, created_at) VALUES (?, ?, ?, NULL, ?)")
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.name)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| write_error(e, &format!("user '{email}'")))?;

        Ok(user)
    }

    pub async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserSummary>, RepositoryError> {
        let row = sqlx::query("SELECT id, email, name, avatar_url FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id").map_err(query_error)?;
                Ok(Some(UserSummary {
                    id: parse_uuid(&id)?,
                    name: row.try_get("name").map_err(query_error)?,
                    email: row.try_get("email").map_err(query_error)?,
                    avatar_url: row.try_get("avatar_url").map_err(query_error)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Add `user_id` to an organization. Returns the new member id.
    pub async fn add_member(
        &self,
        organization_id: &OrganizationId,
        user_id: &Uuid,
        role: MemberRole,
    ) -> Result<Uuid, RepositoryError> {
        let id = Uuid::now_v7();

        sqlx::query(
            "INSERT INTO org_members (id, organization_id, user_id, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(user_id.to_string())
        .bind(role.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| write_error(e, "membership"))?;

        Ok(id)
    }

    pub async fn create_environment(
        &self,
        organization_id: &OrganizationId,
        slug: &str,
        kind: EnvironmentKind,
    ) -> Result<AuthenticatedEnvironment, RepositoryError> {
        let env = AuthenticatedEnvironment {
            id: EnvironmentId::new(),
            slug: slug.to_string(),
            kind,
            organization_id: organization_id.clone(),
        };

        sqlx::query(
            "INSERT INTO environments (id, organization_id, slug, kind, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(env.id.to_string())
        .bind(organization_id.to_string())
        .bind(slug)
        .bind(kind.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| write_error(e, &format!("environment '{slug}'")))?;

        Ok(env)
    }

    pub async fn find_environment(
        &self,
        organization_id: &OrganizationId,
        slug: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, slug, kind FROM environments WHERE organization_id = ? AND slug = ?",
        )
        .bind(organization_id.to_string())
        .bind(slug)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id").map_err(query_error)?;
                let kind: String = row.try_get("kind").map_err(query_error)?;
                Ok(Some(AuthenticatedEnvironment {
                    id: EnvironmentId::from_uuid(parse_uuid(&id)?),
                    slug: row.try_get("slug").map_err(query_error)?,
                    kind: kind.parse().map_err(RepositoryError::Query)?,
                    organization_id: organization_id.clone(),
                }))
            }
            None => Ok(None),
        }
    }

    /// Register an integration endpoint in an environment. Returns its id.
    pub async fn create_endpoint(
        &self,
        environment_id: &EnvironmentId,
        slug: &str,
        url: Option<&str>,
    ) -> Result<Uuid, RepositoryError> {
        let id = Uuid::now_v7();

        sqlx::query(
            "INSERT INTO endpoints (id, environment_id, slug, url, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(environment_id.to_string())
        .bind(slug)
        .bind(url)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| write_error(e, &format!("endpoint '{slug}'")))?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;

    #[tokio::test]
    async fn test_create_and_find_organization() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteTenantRepository::new(test_pool(&dir).await);

        let created = repo.create_organization("acme", "Acme").await.unwrap();
        let found = repo.find_organization("acme").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.title, "Acme");
        assert!(repo.find_organization("globex").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_organization_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteTenantRepository::new(test_pool(&dir).await);

        repo.create_organization("acme", "Acme").await.unwrap();
        let err = repo.create_organization("acme", "Acme 2").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_user_email_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteTenantRepository::new(test_pool(&dir).await);

        let user = repo.create_user(" Ana@Acme.Test", Some("Ana")).await.unwrap();
        assert_eq!(user.email, "ana@acme.test");
        let found = repo.find_user_by_email("ANA@acme.test").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_environment_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteTenantRepository::new(test_pool(&dir).await);

        let org = repo.create_organization("acme", "Acme").await.unwrap();
        let env = repo
            .create_environment(&org.id, "prod", EnvironmentKind::Production)
            .await
            .unwrap();
        let found = repo.find_environment(&org.id, "prod").await.unwrap().unwrap();
        assert_eq!(found, env);
    }

    #[tokio::test]
    async fn test_duplicate_endpoint_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteTenantRepository::new(test_pool(&dir).await);

        let org = repo.create_organization("acme", "Acme").await.unwrap();
        let env = repo
            .create_environment(&org.id, "dev", EnvironmentKind::Development)
            .await
            .unwrap();
        repo.create_endpoint(&env.id, "github", None).await.unwrap();
        let err = repo.create_endpoint(&env.id, "github", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
