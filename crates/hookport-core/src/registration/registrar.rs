//! TriggerRegistrar trait -- the dispatch target of the intake pipeline.
//!
//! Creating or updating the registration record, and any idempotency rules
//! for repeated registrations, belong to the implementation.

use std::future::Future;
use std::pin::Pin;

use hookport_types::environment::AuthenticatedEnvironment;
use hookport_types::error::RegistrationError;
use hookport_types::trigger::{RegisterTriggerBody, RegistrationPath, TriggerRegistration};

/// Registration service keyed by (environment, endpoint slug, trigger id, key).
pub trait TriggerRegistrar: Send + Sync {
    /// Register `payload` under `path` within `environment`.
    fn register(
        &self,
        environment: &AuthenticatedEnvironment,
        payload: RegisterTriggerBody,
        path: &RegistrationPath,
    ) -> impl Future<Output = Result<TriggerRegistration, RegistrationError>> + Send;
}

/// Object-safe version of [`TriggerRegistrar`] with boxed futures.
pub trait TriggerRegistrarDyn: Send + Sync {
    fn register_boxed<'a>(
        &'a self,
        environment: &'a AuthenticatedEnvironment,
        payload: RegisterTriggerBody,
        path: &'a RegistrationPath,
    ) -> Pin<Box<dyn Future<Output = Result<TriggerRegistration, RegistrationError>> + Send + 'a>>;
}

impl<T: TriggerRegistrar> TriggerRegistrarDyn for T {
    fn register_boxed<'a>(
        &'a self,
        environment: &'a AuthenticatedEnvironment,
        payload: RegisterTriggerBody,
        path: &'a RegistrationPath,
    ) -> Pin<Box<dyn Future<Output = Result<TriggerRegistration, RegistrationError>> + Send + 'a>>
    {
        Box::pin(self.register(environment, payload, path))
    }
}

/// Type-erased registrar for runtime backend selection (SQLite vs remote HTTP).
pub struct BoxTriggerRegistrar {
    inner: Box<dyn TriggerRegistrarDyn>,
}

impl BoxTriggerRegistrar {
    pub fn new<T: TriggerRegistrar + 'static>(registrar: T) -> Self {
        Self {
            inner: Box::new(registrar),
        }
    }
}

impl TriggerRegistrar for BoxTriggerRegistrar {
    async fn register(
        &self,
        environment: &AuthenticatedEnvironment,
        payload: RegisterTriggerBody,
        path: &RegistrationPath,
    ) -> Result<TriggerRegistration, RegistrationError> {
        self.inner.register_boxed(environment, payload, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hookport_types::environment::{EnvironmentId, EnvironmentKind};
    use hookport_types::organization::OrganizationId;
    use uuid::Uuid;

    struct EchoRegistrar;

    impl TriggerRegistrar for EchoRegistrar {
        async fn register(
            &self,
            environment: &AuthenticatedEnvironment,
            payload: RegisterTriggerBody,
            path: &RegistrationPath,
        ) -> Result<TriggerRegistration, RegistrationError> {
            if path.endpoint_slug == "missing" {
                return Err(RegistrationError::Rejected("Endpoint not found".to_string()));
            }
            let now = Utc::now();
            Ok(TriggerRegistration {
                id: Uuid::now_v7(),
                environment_id: environment.id.clone(),
                endpoint_slug: path.endpoint_slug.clone(),
                trigger_id: path.id.clone(),
                key: path.key.clone(),
                source: payload,
                secret: "whsec_test".to_string(),
                active: true,
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn environment() -> AuthenticatedEnvironment {
        AuthenticatedEnvironment {
            id: EnvironmentId::new(),
            slug: "dev".to_string(),
            kind: EnvironmentKind::Development,
            organization_id: OrganizationId::new(),
        }
    }

    fn path(endpoint_slug: &str) -> RegistrationPath {
        RegistrationPath {
            endpoint_slug: endpoint_slug.to_string(),
            id: "trg_1".to_string(),
            key: "k1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_boxed_registrar_delegates() {
        let boxed = BoxTriggerRegistrar::new(EchoRegistrar);
        let env = environment();
        let body = RegisterTriggerBody::parse(br#"{"type":"webhook"}"#).unwrap();

        let registration = boxed.register(&env, body.clone(), &path("acme")).await.unwrap();
        assert_eq!(registration.environment_id, env.id);
        assert_eq!(registration.endpoint_slug, "acme");
        assert_eq!(registration.source, body);

        let err = boxed.register(&env, body, &path("missing")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Rejected(msg) if msg == "Endpoint not found"));
    }
}
