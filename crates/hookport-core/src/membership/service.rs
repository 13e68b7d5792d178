//! Team membership service.
//!
//! Every operation except invite lookup is scoped by the calling user: an
//! organization is only visible to its own members.

use uuid::Uuid;
use validator::ValidateEmail;

use hookport_types::error::MembershipError;
use hookport_types::organization::{OrgMemberDetails, OrgMemberInviteDetails, TeamRoster};

use crate::membership::repository::MembershipRepository;

/// Service for listing, inviting and removing organization members.
pub struct MembershipService<R: MembershipRepository> {
    repo: R,
}

impl<R: MembershipRepository> MembershipService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Members and open invites of the organization `slug`.
    ///
    /// Returns `None` when the organization does not exist or `user_id` is
    /// not one of its members.
    pub async fn get_team_members_and_invites(
        &self,
        user_id: &Uuid,
        slug: &str,
    ) -> Result<Option<TeamRoster>, MembershipError> {
        let Some(org) = self.repo.find_organization_for_member(slug, user_id).await? else {
            return Ok(None);
        };

        let members = self.repo.list_members(&org.id).await?;
        let invites = self.repo.list_invites(&org.id).await?;

        Ok(Some(TeamRoster { members, invites }))
    }

    /// Remove `member_id` from the organization `slug` on behalf of `user_id`.
    pub async fn remove_team_member(
        &self,
        user_id: &Uuid,
        slug: &str,
        member_id: &Uuid,
    ) -> Result<OrgMemberDetails, MembershipError> {
        let org = self
            .repo
            .find_organization_for_member(slug, user_id)
            .await?
            .ok_or(MembershipError::NoAccess)?;

        let removed = self
            .repo
            .delete_member(&org.id, member_id)
            .await?
            .ok_or(MembershipError::MemberNotFound)?;

        tracing::info!(
            organization = %org.slug,
            member_id = %removed.id,
            removed_by = %user_id,
            "Removed team member"
        );

        Ok(removed)
    }

    /// Invite `emails` to the organization `slug` on behalf of `user_id`.
    ///
    /// Emails are normalized (trimmed, lowercased, de-duplicated). Emails
    /// that already have an invite are skipped, and the caller's invites for
    /// all requested emails are returned.
    pub async fn invite_members(
        &self,
        slug: &str,
        emails: &[String],
        user_id: &Uuid,
    ) -> Result<Vec<OrgMemberInviteDetails>, MembershipError> {
        let emails = normalize_emails(emails)?;

        let org = self
            .repo
            .find_organization_for_member(slug, user_id)
            .await?
            .ok_or(MembershipError::NoAccess)?;

        let created = self.repo.create_invites(&org.id, user_id, &emails).await?;
        tracing::info!(
            organization = %org.slug,
            requested = emails.len(),
            created,
            "Invited team members"
        );

        Ok(self.repo.find_invites(&org.id, user_id, &emails).await?)
    }

    /// Look up an invite by its token.
    pub async fn get_invite_from_token(
        &self,
        token: &str,
    ) -> Result<Option<OrgMemberInviteDetails>, MembershipError> {
        Ok(self.repo.find_invite_by_token(token).await?)
    }
}

/// Trim, lowercase and de-duplicate emails, preserving first-seen order.
fn normalize_emails(emails: &[String]) -> Result<Vec<String>, MembershipError> {
    let mut normalized: Vec<String> = Vec::with_capacity(emails.len());
    for raw in emails {
        let email = raw.trim().to_lowercase();
        if !email.validate_email() {
            return Err(MembershipError::InvalidEmail(raw.clone()));
        }
        if !normalized.contains(&email) {
            normalized.push(email);
        }
    }
    Ok(normalized)
}
