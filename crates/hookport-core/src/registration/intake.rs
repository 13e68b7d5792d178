//! Trigger registration intake.
//!
//! A request moves strictly forward through hard gates:
//!
//! ```text
//! Pending -> MethodChecked -> ParamsValidated -> Authenticated -> BodyValidated -> Dispatched
//! ```
//!
//! Failing any gate ends the request. Nothing is retried and nothing is kept
//! between requests, so one `RegistrationIntake` can serve any number of
//! concurrent requests.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use secrecy::{ExposeSecret, SecretString};

use hookport_types::error::RegistrationError;
use hookport_types::trigger::{RegisterTriggerBody, RegistrationPath, TriggerRegistration};

use crate::auth::authenticator::ApiAuthenticator;
use crate::registration::registrar::TriggerRegistrar;

/// The only HTTP method the intake accepts.
pub const REQUIRED_METHOD: &str = "PUT";

/// A raw registration request, before any validation.
#[derive(Debug)]
pub struct IntakeRequest {
    pub method: String,
    /// Full request URL, used only for logging.
    pub url: String,
    /// Router path parameters, possibly incomplete.
    pub params: HashMap<String, String>,
    /// Credential extracted from the request headers, if any.
    pub api_key: Option<SecretString>,
    pub body: Vec<u8>,
}

/// Last gate a request passed before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStage {
    Pending,
    MethodChecked,
    ParamsValidated,
    Authenticated,
    BodyValidated,
    Dispatched,
}

impl fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntakeStage::Pending => "pending",
            IntakeStage::MethodChecked => "method_checked",
            IntakeStage::ParamsValidated => "params_validated",
            IntakeStage::Authenticated => "authenticated",
            IntakeStage::BodyValidated => "body_validated",
            IntakeStage::Dispatched => "dispatched",
        };
        write!(f, "{name}")
    }
}

/// Terminal failure of a registration request.
///
/// `Display` yields the message that is safe to return to the caller.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Invalid params")]
    InvalidParams,

    #[error("Invalid or Missing API key")]
    Unauthenticated,

    #[error("Invalid request body")]
    InvalidBody,

    /// The registrar rejected the request with a caller-visible message.
    #[error("{0}")]
    Dispatch(String),

    /// Anything unexpected, including backend faults and panics.
    #[error("Something went wrong")]
    Unknown { stage: IntakeStage },
}

impl IntakeError {
    /// HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            IntakeError::MethodNotAllowed => 405,
            IntakeError::InvalidParams => 400,
            IntakeError::Unauthenticated => 401,
            IntakeError::InvalidBody => 400,
            IntakeError::Dispatch(_) => 400,
            IntakeError::Unknown { .. } => 500,
        }
    }

    /// Last gate the request passed before failing.
    ///
    /// The method check is the first gate, so a method failure reports `Pending`.
    pub fn stage(&self) -> IntakeStage {
        match self {
            IntakeError::MethodNotAllowed => IntakeStage::Pending,
            IntakeError::InvalidParams => IntakeStage::MethodChecked,
            IntakeError::Unauthenticated => IntakeStage::ParamsValidated,
            IntakeError::InvalidBody => IntakeStage::Authenticated,
            IntakeError::Dispatch(_) => IntakeStage::BodyValidated,
            IntakeError::Unknown { stage } => *stage,
        }
    }
}

/// Guarded pass-through from an HTTP request to a [`TriggerRegistrar`].
pub struct RegistrationIntake<A: ApiAuthenticator, R: TriggerRegistrar> {
    authenticator: A,
    registrar: R,
}

impl<A: ApiAuthenticator, R: TriggerRegistrar> RegistrationIntake<A, R> {
    pub fn new(authenticator: A, registrar: R) -> Self {
        Self {
            authenticator,
            registrar,
        }
    }

    /// Run a request through every gate and dispatch it.
    ///
    /// The authenticator is only consulted for well-formed paths, the body
    /// is only parsed for authenticated requests, and the registrar is
    /// called at most once, only for fully validated requests.
    pub async fn handle(&self, request: IntakeRequest) -> Result<TriggerRegistration, IntakeError> {
        let IntakeRequest {
            method,
            url,
            params,
            api_key,
            body,
        } = request;

        tracing::info!(url = %url, "Registering trigger");

        if !method.eq_ignore_ascii_case(REQUIRED_METHOD) {
            tracing::info!(url = %url, method = %method, "Method not allowed");
            return Err(IntakeError::MethodNotAllowed);
        }

        let path = RegistrationPath::from_params(&params).map_err(|e| {
            tracing::info!(?params, error = %e, "Invalid params");
            IntakeError::InvalidParams
        })?;

        let environment = match api_key {
            Some(api_key) => {
                let lookup = self.authenticator.authenticate(api_key.expose_secret());
                match AssertUnwindSafe(lookup).catch_unwind().await {
                    Ok(Ok(environment)) => environment,
                    Ok(Err(e)) => {
                        tracing::error!(url = %url, error = %e, "API key lookup failed");
                        return Err(IntakeError::Unknown {
                            stage: IntakeStage::ParamsValidated,
                        });
                    }
                    Err(_) => {
                        tracing::error!(url = %url, "API key lookup panicked");
                        return Err(IntakeError::Unknown {
                            stage: IntakeStage::ParamsValidated,
                        });
                    }
                }
            }
            None => None,
        };

        let Some(environment) = environment else {
            tracing::info!(url = %url, "Invalid or missing api key");
            return Err(IntakeError::Unauthenticated);
        };

        let payload = RegisterTriggerBody::parse(&body).map_err(|e| {
            tracing::info!(url = %url, error = %e, "Invalid request body");
            IntakeError::InvalidBody
        })?;

        let dispatch = self.registrar.register(&environment, payload, &path);
        match AssertUnwindSafe(dispatch).catch_unwind().await {
            Ok(Ok(registration)) => {
                tracing::info!(
                    url = %url,
                    registration_id = %registration.id,
                    environment_id = %environment.id,
                    endpoint_slug = %path.endpoint_slug,
                    trigger_id = %path.id,
                    "Trigger registered"
                );
                Ok(registration)
            }
            Ok(Err(RegistrationError::Rejected(message))) => {
                tracing::error!(url = %url, error = %message, "Error registering trigger");
                Err(IntakeError::Dispatch(message))
            }
            Ok(Err(RegistrationError::Unexpected(detail))) => {
                tracing::error!(url = %url, error = %detail, "Unexpected error registering trigger");
                Err(IntakeError::Unknown {
                    stage: IntakeStage::BodyValidated,
                })
            }
            Err(_) => {
                tracing::error!(url = %url, "Trigger registrar panicked");
                Err(IntakeError::Unknown {
                    stage: IntakeStage::BodyValidated,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use hookport_types::environment::{AuthenticatedEnvironment, EnvironmentId, EnvironmentKind};
    use hookport_types::error::RepositoryError;
    use hookport_types::organization::OrganizationId;

    const VALID_KEY: &str = "hp_dev_0123456789";

    fn environment() -> AuthenticatedEnvironment {
        AuthenticatedEnvironment {
            id: EnvironmentId::from_uuid(Uuid::from_u128(7)),
            slug: "dev".to_string(),
            kind: EnvironmentKind::Development,
            organization_id: OrganizationId::from_uuid(Uuid::from_u128(1)),
        }
    }

    struct FakeAuthenticator {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeAuthenticator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl ApiAuthenticator for FakeAuthenticator {
        async fn authenticate(
            &self,
            api_key: &str,
        ) -> Result<Option<AuthenticatedEnvironment>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepositoryError::Connection);
            }
            Ok((api_key == VALID_KEY).then(environment))
        }
    }

    enum Outcome {
        Succeed,
        Reject(&'static str),
        Unexpected,
        Panic,
    }

    struct FakeRegistrar {
        outcome: Outcome,
        calls: Mutex<Vec<(AuthenticatedEnvironment, RegisterTriggerBody, RegistrationPath)>>,
    }

    impl FakeRegistrar {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TriggerRegistrar for FakeRegistrar {
        async fn register(
            &self,
            environment: &AuthenticatedEnvironment,
            payload: RegisterTriggerBody,
            path: &RegistrationPath,
        ) -> Result<TriggerRegistration, RegistrationError> {
            self.calls
                .lock()
                .unwrap()
                .push((environment.clone(), payload.clone(), path.clone()));
            match self.outcome {
                Outcome::Succeed => Ok(TriggerRegistration {
                    id: Uuid::from_u128(42),
                    environment_id: environment.id.clone(),
                    endpoint_slug: path.endpoint_slug.clone(),
                    trigger_id: path.id.clone(),
                    key: path.key.clone(),
                    source: payload,
                    secret: "whsec_test".to_string(),
                    active: true,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }),
                Outcome::Reject(msg) => Err(RegistrationError::Rejected(msg.to_string())),
                Outcome::Unexpected => Err(RegistrationError::Unexpected(
                    "connection reset".to_string(),
                )),
                Outcome::Panic => panic!("registrar bug"),
            }
        }
    }

    fn intake(
        authenticator: FakeAuthenticator,
        outcome: Outcome,
    ) -> RegistrationIntake<FakeAuthenticator, FakeRegistrar> {
        RegistrationIntake::new(authenticator, FakeRegistrar::new(outcome))
    }

    fn valid_params() -> HashMap<String, String> {
        [("endpointSlug", "acme"), ("id", "trg_1"), ("key", "k1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn request(method: &str) -> IntakeRequest {
        IntakeRequest {
            method: method.to_string(),
            url: "http://localhost/api/v1/acme/triggers/trg_1/registrations/k1".to_string(),
            params: valid_params(),
            api_key: Some(SecretString::from(VALID_KEY)),
            body: br#"{"type":"webhook"}"#.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_valid_request_dispatches_exact_tuple_once() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);

        let registration = intake.handle(request("PUT")).await.unwrap();
        assert_eq!(registration.id, Uuid::from_u128(42));
        assert_eq!(registration.endpoint_slug, "acme");

        let calls = intake.registrar.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (env, payload, path) = &calls[0];
        assert_eq!(env, &environment());
        assert_eq!(payload, &RegisterTriggerBody::parse(br#"{"type":"webhook"}"#).unwrap());
        assert_eq!(path.endpoint_slug, "acme");
        assert_eq!(path.id, "trg_1");
        assert_eq!(path.key, "k1");
    }

    #[tokio::test]
    async fn test_method_comparison_is_case_insensitive() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
        assert!(intake.handle(request("put")).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_put_methods_stop_before_authentication() {
        for method in ["GET", "POST", "DELETE", "PATCH", "HEAD", "OPTIONS"] {
            let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
            let err = intake.handle(request(method)).await.unwrap_err();
            assert!(matches!(err, IntakeError::MethodNotAllowed), "{method}");
            assert_eq!(err.status_code(), 405);
            assert_eq!(err.to_string(), "Method Not Allowed");
            assert_eq!(intake.authenticator.calls.load(Ordering::SeqCst), 0);
            assert!(intake.registrar.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_params_never_reach_authenticator() {
        for missing in ["endpointSlug", "id", "key"] {
            let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
            let mut req = request("PUT");
            req.params.remove(missing);

            let err = intake.handle(req).await.unwrap_err();
            assert!(matches!(err, IntakeError::InvalidParams), "{missing}");
            assert_eq!(err.status_code(), 400);
            assert_eq!(err.to_string(), "Invalid params");
            assert_eq!(intake.authenticator.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_param_is_invalid() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
        let mut req = request("PUT");
        req.params.insert("key".to_string(), String::new());

        let err = intake.handle(req).await.unwrap_err();
        assert!(matches!(err, IntakeError::InvalidParams));
    }

    #[tokio::test]
    async fn test_missing_credential_is_unauthenticated_without_lookup() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
        let mut req = request("PUT");
        req.api_key = None;
        req.body = b"not even json".to_vec();

        let err = intake.handle(req).await.unwrap_err();
        assert!(matches!(err, IntakeError::Unauthenticated));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_string(), "Invalid or Missing API key");
        assert_eq!(intake.authenticator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_credential_skips_body_parsing() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
        let mut req = request("PUT");
        req.api_key = Some(SecretString::from("hp_dev_wrong"));
        // An unparseable body would yield InvalidBody if it were read.
        req.body = b"{".to_vec();

        let err = intake.handle(req).await.unwrap_err();
        assert!(matches!(err, IntakeError::Unauthenticated));
        assert_eq!(intake.authenticator.calls.load(Ordering::SeqCst), 1);
        assert!(intake.registrar.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authenticator_fault_is_unknown_failure() {
        let intake = intake(FakeAuthenticator::failing(), Outcome::Succeed);

        let err = intake.handle(request("PUT")).await.unwrap_err();
        assert!(matches!(err, IntakeError::Unknown { .. }));
        assert_eq!(err.stage(), IntakeStage::ParamsValidated);
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_invalid_body_never_reaches_registrar() {
        let bodies: [&[u8]; 4] = [b"{", br#"{"type":"fax"}"#, b"[]", b""];
        for body in bodies {
            let intake = intake(FakeAuthenticator::new(), Outcome::Succeed);
            let mut req = request("PUT");
            req.body = body.to_vec();

            let err = intake.handle(req).await.unwrap_err();
            assert!(matches!(err, IntakeError::InvalidBody));
            assert_eq!(err.status_code(), 400);
            assert_eq!(err.to_string(), "Invalid request body");
            assert!(intake.registrar.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_rejected_dispatch_surfaces_message() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Reject("Endpoint not found"));

        let err = intake.handle(request("PUT")).await.unwrap_err();
        assert!(matches!(err, IntakeError::Dispatch(_)));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Endpoint not found");
        assert_eq!(err.stage(), IntakeStage::BodyValidated);
    }

    #[tokio::test]
    async fn test_unexpected_dispatch_failure_hides_detail() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Unexpected);

        let err = intake.handle(request("PUT")).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Something went wrong");
        assert!(!err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_registrar_panic_becomes_unknown_failure() {
        let intake = intake(FakeAuthenticator::new(), Outcome::Panic);

        let err = intake.handle(request("PUT")).await.unwrap_err();
        assert!(matches!(err, IntakeError::Unknown { .. }));
        assert_eq!(err.status_code(), 500);
        assert_eq!(intake.registrar.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stage_is_last_gate_passed() {
        assert_eq!(IntakeError::MethodNotAllowed.stage(), IntakeStage::Pending);
        assert_eq!(IntakeError::InvalidParams.stage(), IntakeStage::MethodChecked);
        assert_eq!(IntakeError::InvalidBody.stage(), IntakeStage::Authenticated);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(IntakeStage::BodyValidated.to_string(), "body_validated");
    }
}
