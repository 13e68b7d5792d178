use thiserror::Error;

/// Schema failures while reading a registration request.
///
/// Both variants are client errors; they differ only in message.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid params: {0}")]
    Params(String),

    #[error("invalid request body: {0}")]
    Body(String),
}

/// Errors reported by a trigger registrar.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The registration service refused the request. The message is safe to
    /// surface to the caller.
    #[error("{0}")]
    Rejected(String),

    /// Any other failure. Never surfaced to the caller.
    #[error("unexpected registration failure: {0}")]
    Unexpected(String),
}

/// Errors related to organization membership operations.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("User does not have access to this organization")]
    NoAccess,

    #[error("member not found")]
    MemberNotFound,

    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepositoryError> for MembershipError {
    fn from(e: RepositoryError) -> Self {
        MembershipError::StorageError(e.to_string())
    }
}

/// Errors from repository operations (used by trait definitions in hookport-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_is_bare_message() {
        let err = RegistrationError::Rejected("Endpoint not found".to_string());
        assert_eq!(err.to_string(), "Endpoint not found");
    }

    #[test]
    fn test_no_access_display() {
        assert_eq!(
            MembershipError::NoAccess.to_string(),
            "User does not have access to this organization"
        );
    }

    #[test]
    fn test_repository_error_into_membership_error() {
        let err: MembershipError = RepositoryError::Query("syntax error".to_string()).into();
        assert_eq!(err.to_string(), "storage error: query error: syntax error");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::Params("missing 'key'".to_string());
        assert_eq!(err.to_string(), "invalid params: missing 'key'");
    }
}
