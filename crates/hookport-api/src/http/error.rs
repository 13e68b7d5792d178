//! Application error type mapping to HTTP status codes and the `{error}` envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use hookport_core::registration::intake::IntakeError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure reported by the registration intake.
    Intake(IntakeError),
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        AppError::Intake(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Intake(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Intake(e) => e.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookport_core::registration::intake::IntakeStage;

    #[test]
    fn intake_errors_keep_their_status() {
        let cases = [
            (IntakeError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (IntakeError::InvalidParams, StatusCode::BAD_REQUEST),
            (IntakeError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (IntakeError::InvalidBody, StatusCode::BAD_REQUEST),
            (IntakeError::Dispatch("nope".into()), StatusCode::BAD_REQUEST),
            (
                IntakeError::Unknown {
                    stage: IntakeStage::BodyValidated,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = AppError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
