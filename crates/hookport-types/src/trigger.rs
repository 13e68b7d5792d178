//! Trigger registration types: the path identity, the versioned request body
//! and the registration record returned by a registrar.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::environment::EnvironmentId;
use crate::error::SchemaError;

/// Path-addressed identity of a registration:
/// `/api/v1/{endpointSlug}/triggers/{id}/registrations/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPath {
    #[validate(length(min = 1))]
    pub endpoint_slug: String,
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub key: String,
}

impl RegistrationPath {
    /// Build a path identity from raw router parameters.
    ///
    /// All three of `endpointSlug`, `id` and `key` must be present and
    /// non-empty. Extra parameters are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, SchemaError> {
        let field = |name: &str| {
            params
                .get(name)
                .cloned()
                .ok_or_else(|| SchemaError::Params(format!("missing '{name}'")))
        };

        let path = Self {
            endpoint_slug: field("endpointSlug")?,
            id: field("id")?,
            key: field("key")?,
        };

        path.validate()
            .map_err(|e| SchemaError::Params(e.to_string()))?;

        Ok(path)
    }
}

/// Schema revision of a registration body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyVersion {
    #[default]
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2")]
    V2,
}

/// Kind of event source being registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Webhook,
    Http,
    Sqs,
    Smtp,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Webhook => write!(f, "webhook"),
            TriggerKind::Http => write!(f, "http"),
            TriggerKind::Sqs => write!(f, "sqs"),
            TriggerKind::Smtp => write!(f, "smtp"),
        }
    }
}

/// Filter deciding which source events fire the trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRule {
    #[validate(length(min = 1))]
    pub event: String,
    #[validate(length(min = 1))]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Body of a trigger registration request.
///
/// Validated, never interpreted, by the intake. The registrar stores it as
/// the registration's source description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_version_requirements"))]
pub struct RegisterTriggerBody {
    #[serde(default)]
    pub version: BodyVersion,
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    #[serde(default)]
    #[validate(custom(function = "validate_event_names"))]
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub rule: Option<EventRule>,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub client_id: Option<String>,
}

impl RegisterTriggerBody {
    /// Parse and schema-check a raw JSON body.
    pub fn parse(raw: &[u8]) -> Result<Self, SchemaError> {
        let body: Self =
            serde_json::from_slice(raw).map_err(|e| SchemaError::Body(e.to_string()))?;
        body.validate()
            .map_err(|e| SchemaError::Body(e.to_string()))?;
        Ok(body)
    }
}

fn validate_event_names(events: &[String]) -> Result<(), validator::ValidationError> {
    if events.iter().any(|e| e.trim().is_empty()) {
        return Err(validator::ValidationError::new("empty_event_name"));
    }
    Ok(())
}

fn validate_version_requirements(
    body: &RegisterTriggerBody,
) -> Result<(), validator::ValidationError> {
    if body.version == BodyVersion::V2 && body.rule.is_none() {
        return Err(validator::ValidationError::new("v2_requires_rule"));
    }
    Ok(())
}

/// A trigger registration as stored by the registration service.
///
/// Returned verbatim to the caller on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRegistration {
    pub id: Uuid,
    pub environment_id: EnvironmentId,
    pub endpoint_slug: String,
    pub trigger_id: String,
    pub key: String,
    pub source: RegisterTriggerBody,
    /// Shared secret the event source uses to sign deliveries.
    pub secret: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
