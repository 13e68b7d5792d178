use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::organization::OrganizationId;

/// Unique identifier for a runtime environment, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentId(pub Uuid);

impl EnvironmentId {
    /// Create a new EnvironmentId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create an EnvironmentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for EnvironmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EnvironmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Deployment stage an environment belongs to.
///
/// The kind is embedded in minted API keys (`hp_dev_...`, `hp_prod_...`)
/// so operators can tell keys apart at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Development,
    Staging,
    Production,
}

impl EnvironmentKind {
    /// Short tag used inside API key prefixes.
    pub fn key_tag(&self) -> &'static str {
        match self {
            EnvironmentKind::Development => "dev",
            EnvironmentKind::Staging => "stg",
            EnvironmentKind::Production => "prod",
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentKind::Development => write!(f, "development"),
            EnvironmentKind::Staging => write!(f, "staging"),
            EnvironmentKind::Production => write!(f, "production"),
        }
    }
}

impl FromStr for EnvironmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(EnvironmentKind::Development),
            "staging" | "stg" => Ok(EnvironmentKind::Staging),
            "production" | "prod" => Ok(EnvironmentKind::Production),
            other => Err(format!("invalid environment kind: '{other}'")),
        }
    }
}

/// Tenant execution context resolved from an API key.
///
/// Opaque to the intake pipeline: it is produced by the authenticator and
/// passed through unchanged to the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedEnvironment {
    pub id: EnvironmentId,
    pub slug: String,
    pub kind: EnvironmentKind,
    pub organization_id: OrganizationId,
}
