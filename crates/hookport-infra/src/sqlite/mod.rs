//! SQLite storage backed by sqlx with split reader/writer pools.

pub mod api_key;
pub mod membership;
pub mod pool;
pub mod registration;
pub mod tenant;

use chrono::{DateTime, Utc};
use hookport_types::error::RepositoryError;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepositoryError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid uuid: {e}")))
}

pub(crate) fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}
