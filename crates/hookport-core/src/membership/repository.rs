//! Membership repository trait definition.

use std::future::Future;

use uuid::Uuid;

use hookport_types::error::RepositoryError;
use hookport_types::organization::{
    OrgMember, OrgMemberDetails, OrgMemberInvite, OrgMemberInviteDetails, Organization,
    OrganizationId,
};

/// Storage for organizations, their members and pending invites.
pub trait MembershipRepository: Send + Sync {
    /// Find the organization with `slug`, but only if `user_id` is one of its members.
    fn find_organization_for_member(
        &self,
        slug: &str,
        user_id: &Uuid,
    ) -> impl Future<Output = Result<Option<Organization>, RepositoryError>> + Send;

    /// All members of an organization, with their users.
    fn list_members(
        &self,
        organization_id: &OrganizationId,
    ) -> impl Future<Output = Result<Vec<OrgMember>, RepositoryError>> + Send;

    /// All open invites of an organization, with their inviters.
    fn list_invites(
        &self,
        organization_id: &OrganizationId,
    ) -> impl Future<Output = Result<Vec<OrgMemberInvite>, RepositoryError>> + Send;

    /// Delete a member of the given organization.
    ///
    /// Returns the deleted member, or `None` if no such member exists in
    /// that organization.
    fn delete_member(
        &self,
        organization_id: &OrganizationId,
        member_id: &Uuid,
    ) -> impl Future<Output = Result<Option<OrgMemberDetails>, RepositoryError>> + Send;

    /// Insert one invite per email, silently skipping emails that are
    /// already invited to the organization. Returns the number inserted.
    fn create_invites(
        &self,
        organization_id: &OrganizationId,
        inviter_id: &Uuid,
        emails: &[String],
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Invites sent by `inviter_id` for any of `emails`.
    fn find_invites(
        &self,
        organization_id: &OrganizationId,
        inviter_id: &Uuid,
        emails: &[String],
    ) -> impl Future<Output = Result<Vec<OrgMemberInviteDetails>, RepositoryError>> + Send;

    /// Look up an invite by the token in its invitation link.
    fn find_invite_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<OrgMemberInviteDetails>, RepositoryError>> + Send;
}
