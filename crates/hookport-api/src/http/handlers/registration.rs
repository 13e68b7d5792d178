//! Trigger registration handler.
//!
//! Mounted with `any(...)`: the intake itself enforces the method, so every
//! verb reaches it and gets the same error envelope.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{OriginalUri, Path, State};
use axum::http::{HeaderMap, Method};

use hookport_core::registration::intake::IntakeRequest;
use hookport_types::trigger::TriggerRegistration;

use crate::http::error::AppError;
use crate::http::extractors::auth::extract_api_key;
use crate::state::AppState;

/// ANY /api/v1/{endpointSlug}/triggers/{id}/registrations/{key}
pub async fn register_trigger(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TriggerRegistration>, AppError> {
    // Undecodable path segments leave the params empty; the intake rejects them.
    let params = match params {
        Ok(Path(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "path params could not be decoded");
            HashMap::new()
        }
    };

    // An unreadable or oversized body is left empty so the method and auth
    // gates still answer first; the body gate then rejects it.
    let body = match body {
        Ok(body) => body.to_vec(),
        Err(rejection) => {
            tracing::debug!(
                status = %rejection.status(),
                error = %rejection,
                "request body could not be read"
            );
            Vec::new()
        }
    };

    let request = IntakeRequest {
        method: method.to_string(),
        url: uri.to_string(),
        params,
        api_key: extract_api_key(&headers),
        body,
    };

    let registration = state.intake.handle(request).await?;
    Ok(Json(registration))
}
