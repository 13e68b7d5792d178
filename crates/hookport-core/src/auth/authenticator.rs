//! ApiAuthenticator trait and its object-safe wrapper.
//!
//! Follows the blanket-impl pattern used for every port in this crate:
//! 1. Define an object-safe `ApiAuthenticatorDyn` trait with boxed futures
//! 2. Blanket-impl `ApiAuthenticatorDyn` for all `T: ApiAuthenticator`
//! 3. `BoxApiAuthenticator` wraps `Box<dyn ApiAuthenticatorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use hookport_types::environment::AuthenticatedEnvironment;
use hookport_types::error::RepositoryError;

/// Resolves an API key to the tenant environment it belongs to.
pub trait ApiAuthenticator: Send + Sync {
    /// Look up the environment owning `api_key`.
    ///
    /// Returns `Ok(None)` when the key is unknown or revoked. `Err` is
    /// reserved for backend faults.
    fn authenticate(
        &self,
        api_key: &str,
    ) -> impl Future<Output = Result<Option<AuthenticatedEnvironment>, RepositoryError>> + Send;
}

/// Object-safe version of [`ApiAuthenticator`] with boxed futures.
pub trait ApiAuthenticatorDyn: Send + Sync {
    fn authenticate_boxed<'a>(
        &'a self,
        api_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<AuthenticatedEnvironment>, RepositoryError>> + Send + 'a>>;
}

impl<T: ApiAuthenticator> ApiAuthenticatorDyn for T {
    fn authenticate_boxed<'a>(
        &'a self,
        api_key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<AuthenticatedEnvironment>, RepositoryError>> + Send + 'a>>
    {
        Box::pin(self.authenticate(api_key))
    }
}

/// Type-erased authenticator, so application state can pick a backend at
/// runtime without becoming generic.
pub struct BoxApiAuthenticator {
    inner: Box<dyn ApiAuthenticatorDyn>,
}

impl BoxApiAuthenticator {
    pub fn new<T: ApiAuthenticator + 'static>(authenticator: T) -> Self {
        Self {
            inner: Box::new(authenticator),
        }
    }
}

impl ApiAuthenticator for BoxApiAuthenticator {
    async fn authenticate(
        &self,
        api_key: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, RepositoryError> {
        self.inner.authenticate_boxed(api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookport_types::environment::{EnvironmentId, EnvironmentKind};
    use hookport_types::organization::OrganizationId;

    struct StaticKey;

    impl ApiAuthenticator for StaticKey {
        async fn authenticate(
            &self,
            api_key: &str,
        ) -> Result<Option<AuthenticatedEnvironment>, RepositoryError> {
            if api_key != "hp_dev_abc" {
                return Ok(None);
            }
            Ok(Some(AuthenticatedEnvironment {
                id: EnvironmentId::new(),
                slug: "dev".to_string(),
                kind: EnvironmentKind::Development,
                organization_id: OrganizationId::new(),
            }))
        }
    }

    #[tokio::test]
    async fn test_boxed_authenticator_delegates() {
        let boxed = BoxApiAuthenticator::new(StaticKey);
        let env = boxed.authenticate("hp_dev_abc").await.unwrap();
        assert_eq!(env.unwrap().slug, "dev");
        assert!(boxed.authenticate("nope").await.unwrap().is_none());
    }
}
