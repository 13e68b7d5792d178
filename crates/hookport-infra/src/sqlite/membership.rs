//! SQLite membership repository implementation.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use hookport_core::membership::repository::MembershipRepository;
use hookport_types::error::RepositoryError;
use hookport_types::organization::{
    MemberRole, OrgMember, OrgMemberDetails, OrgMemberInvite, OrgMemberInviteDetails,
    Organization, OrganizationId, UserSummary,
};

use super::pool::DatabasePool;
use super::{parse_datetime, parse_uuid, query_error};
use crate::crypto::token::generate_invite_token;

/// SQLite-backed implementation of `MembershipRepository`.
pub struct SqliteMembershipRepository {
    pool: DatabasePool,
}

impl SqliteMembershipRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const ORG_COLUMNS: &str = "o.id AS o_id, o.slug AS o_slug, o.title AS o_title, o.created_at AS o_created_at";
const USER_COLUMNS: &str = "u.id AS u_id, u.name AS u_name, u.email AS u_email, u.avatar_url AS u_avatar_url";

/// Read a user from columns aliased with `prefix`.
fn user_from_row(row: &SqliteRow, prefix: &str) -> Result<UserSummary, RepositoryError> {
    let id: String = row.try_get(format!("{prefix}id").as_str()).map_err(query_error)?;
    Ok(UserSummary {
        id: parse_uuid(&id)?,
        name: row.try_get(format!("{prefix}name").as_str()).map_err(query_error)?,
        email: row.try_get(format!("{prefix}email").as_str()).map_err(query_error)?,
        avatar_url: row
            .try_get(format!("{prefix}avatar_url").as_str())
            .map_err(query_error)?,
    })
}

fn organization_from_row(row: &SqliteRow) -> Result<Organization, RepositoryError> {
    let id: String = row.try_get("o_id").map_err(query_error)?;
    let created_at: String = row.try_get("o_created_at").map_err(query_error)?;
    Ok(Organization {
        id: OrganizationId::from_uuid(parse_uuid(&id)?),
        slug: row.try_get("o_slug").map_err(query_error)?,
        title: row.try_get("o_title").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn role_from_row(row: &SqliteRow) -> Result<MemberRole, RepositoryError> {
    let role: String = row.try_get("role").map_err(query_error)?;
    role.parse().map_err(RepositoryError::Query)
}

fn invite_details_from_row(row: &SqliteRow) -> Result<OrgMemberInviteDetails, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_error)?;
    let created_at: String = row.try_get("created_at").map_err(query_error)?;
    Ok(OrgMemberInviteDetails {
        id: parse_uuid(&id)?,
        email: row.try_get("email").map_err(query_error)?,
        token: row.try_get("token").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
        organization: organization_from_row(row)?,
        inviter: user_from_row(row, "u_")?,
    })
}

fn invite_details_query(filter: &str) -> String {
    format!(
        "SELECT i.id, i.email, i.token, i.created_at, {ORG_COLUMNS}, {USER_COLUMNS}
         FROM org_member_invites i
         JOIN organizations o ON o.id = i.organization_id
         JOIN users u ON u.id = i.inviter_id
         WHERE {filter}
         ORDER BY i.created_at, i.email"
    )
}

impl MembershipRepository for SqliteMembershipRepository {
    async fn find_organization_for_member(
        &self,
        slug: &str,
        user_id: &Uuid,
    ) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {ORG_COLUMNS}
             FROM organizations o
             JOIN org_members m ON m.organization_id = o.id
             WHERE o.slug = ? AND m.user_id = ?"
        ))
        .bind(slug)
        .bind(user_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        row.as_ref().map(organization_from_row).transpose()
    }

    async fn list_members(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<OrgMember>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT m.id, m.role, {USER_COLUMNS}
             FROM org_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.organization_id = ?
             ORDER BY m.created_at, u.email"
        ))
        .bind(organization_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(query_error)?;
                Ok(OrgMember {
                    id: parse_uuid(&id)?,
                    role: role_from_row(row)?,
                    user: user_from_row(row, "u_")?,
                })
            })
            .collect()
    }

    async fn list_invites(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<OrgMemberInvite>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT i.id, i.email, i.created_at, {USER_COLUMNS}
             FROM org_member_invites i
             JOIN users u ON u.id = i.inviter_id
             WHERE i.organization_id = ?
             ORDER BY i.created_at, i.email"
        ))
        .bind(organization_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(query_error)?;
                let created_at: String = row.try_get("created_at").map_err(query_error)?;
                Ok(OrgMemberInvite {
                    id: parse_uuid(&id)?,
                    email: row.try_get("email").map_err(query_error)?,
                    created_at: parse_datetime(&created_at)?,
                    inviter: user_from_row(row, "u_")?,
                })
            })
            .collect()
    }

    async fn delete_member(
        &self,
        organization_id: &OrganizationId,
        member_id: &Uuid,
    ) -> Result<Option<OrgMemberDetails>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT m.id, m.role, {ORG_COLUMNS}, {USER_COLUMNS}
             FROM org_members m
             JOIN organizations o ON o.id = m.organization_id
             JOIN users u ON u.id = m.user_id
             WHERE m.id = ? AND m.organization_id = ?"
        ))
        .bind(member_id.to_string())
        .bind(organization_id.to_string())
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(query_error)?;
        let details = OrgMemberDetails {
            id: parse_uuid(&id)?,
            role: role_from_row(&row)?,
            organization: organization_from_row(&row)?,
            user: user_from_row(&row, "u_")?,
        };

        let result = sqlx::query("DELETE FROM org_members WHERE id = ? AND organization_id = ?")
            .bind(member_id.to_string())
            .bind(organization_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(details))
    }

    async fn create_invites(
        &self,
        organization_id: &OrganizationId,
        inviter_id: &Uuid,
        emails: &[String],
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;
        let now = Utc::now().to_rfc3339();
        let mut created = 0;

        for email in emails {
            let result = sqlx::query(
                "INSERT INTO org_member_invites (id, token, email, organization_id, inviter_id, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(organization_id, email) DO NOTHING",
            )
            .bind(Uuid::now_v7().to_string())
            .bind(generate_invite_token())
            .bind(email)
            .bind(organization_id.to_string())
            .bind(inviter_id.to_string())
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

            created += result.rows_affected();
        }

        tx.commit().await.map_err(query_error)?;
        Ok(created)
    }

    async fn find_invites(
        &self,
        organization_id: &OrganizationId,
        inviter_id: &Uuid,
        emails: &[String],
    ) -> Result<Vec<OrgMemberInviteDetails>, RepositoryError> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; emails.len()].join(", ");
        let sql = invite_details_query(&format!(
            "i.organization_id = ? AND i.inviter_id = ? AND i.email IN ({placeholders})"
        ));

        let mut query = sqlx::query(&sql)
            .bind(organization_id.to_string())
            .bind(inviter_id.to_string());
        for email in emails {
            query = query.bind(email);
        }

        let rows = query
            .fetch_all(&self.pool.writer)
            .await
            .map_err(query_error)?;

        rows.iter().map(invite_details_from_row).collect()
    }

    async fn find_invite_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrgMemberInviteDetails>, RepositoryError> {
        let row = sqlx::query(&invite_details_query("i.token = ?"))
            .bind(token)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(invite_details_from_row).transpose()
    }
}
