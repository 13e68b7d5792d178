//! HTTP trigger registrar.
//!
//! Forwards registrations to a remote registration service:
//! `PUT {base}/environments/{env}/endpoints/{slug}/triggers/{id}/registrations/{key}`
//! with the validated body as JSON.

use std::time::Duration;

use anyhow::Context;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use hookport_core::registration::registrar::TriggerRegistrar;
use hookport_types::environment::AuthenticatedEnvironment;
use hookport_types::error::RegistrationError;
use hookport_types::trigger::{RegisterTriggerBody, RegistrationPath, TriggerRegistration};

/// Error body returned by the remote service on rejection.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Registrar that delegates to a remote service over HTTP.
pub struct HttpTriggerRegistrar {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTriggerRegistrar {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid registrar base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("registrar base URL cannot be a base: {base_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    fn registration_url(
        &self,
        environment: &AuthenticatedEnvironment,
        path: &RegistrationPath,
    ) -> Result<Url, RegistrationError> {
        let mut url = self.base_url.clone();
        let environment_id = environment.id.to_string();
        url.path_segments_mut()
            .map_err(|_| RegistrationError::Unexpected("registrar base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend([
                "environments",
                environment_id.as_str(),
                "endpoints",
                path.endpoint_slug.as_str(),
                "triggers",
                path.id.as_str(),
                "registrations",
                path.key.as_str(),
            ]);
        Ok(url)
    }
}

impl TriggerRegistrar for HttpTriggerRegistrar {
    async fn register(
        &self,
        environment: &AuthenticatedEnvironment,
        payload: RegisterTriggerBody,
        path: &RegistrationPath,
    ) -> Result<TriggerRegistration, RegistrationError> {
        let url = self.registration_url(environment, path)?;

        let response = self
            .client
            .put(url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| RegistrationError::Unexpected(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<TriggerRegistration>().await.map_err(|e| {
                RegistrationError::Unexpected(format!("undecodable registration response: {e}"))
            });
        }

        if status.is_client_error() {
            if let Ok(body) = response.json::<ErrorBody>().await {
                tracing::debug!(%status, error = %body.error, "registration rejected upstream");
                return Err(RegistrationError::Rejected(body.error));
            }
        }

        Err(RegistrationError::Unexpected(format!(
            "registration service returned {}",
            status_label(status)
        )))
    }
}

fn status_label(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
