use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for an organization (tenant).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub Uuid);

impl OrganizationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for OrganizationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrganizationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An organization owning environments, endpoints and a team of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    /// URL-safe unique slug ("Acme Corp" -> "acme-corp").
    pub slug: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user, as shown in member and invite listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Role of a member inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Admin,
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Admin => write!(f, "ADMIN"),
            MemberRole::Member => write!(f, "MEMBER"),
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(MemberRole::Admin),
            "MEMBER" => Ok(MemberRole::Member),
            other => Err(format!("invalid member role: '{other}'")),
        }
    }
}

/// A member row joined with its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMember {
    pub id: Uuid,
    pub role: MemberRole,
    pub user: UserSummary,
}

/// A pending invite joined with the user who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMemberInvite {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub inviter: UserSummary,
}

/// Everyone on an organization's team: accepted members and open invites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    pub members: Vec<OrgMember>,
    pub invites: Vec<OrgMemberInvite>,
}

/// A member together with its organization, as returned after removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMemberDetails {
    pub id: Uuid,
    pub role: MemberRole,
    pub organization: Organization,
    pub user: UserSummary,
}

/// An invite together with its organization and inviter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMemberInviteDetails {
    pub id: Uuid,
    pub email: String,
    /// Opaque token carried by the invitation link.
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub organization: Organization,
    pub inviter: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_serializes_uppercase() {
        let json = serde_json::to_string(&MemberRole::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
    }

    #[test]
    fn test_member_role_from_str_is_case_insensitive() {
        assert_eq!("member".parse::<MemberRole>().unwrap(), MemberRole::Member);
        assert!("owner".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_user_summary_camel_case() {
        let user = UserSummary {
            id: Uuid::nil(),
            name: None,
            email: "ana@example.com".to_string(),
            avatar_url: Some("https://example.com/a.png".to_string()),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["avatarUrl"], "https://example.com/a.png");
    }
}
