//! API authentication backed by the token cache
//!
//! Binds one principal and secret to a shared [`TokenCache`] so the transport
//! can ask for a token without knowing the credentials.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use raito_core::{AccessTokenProvider, IdentityProvider, OrgLookup, TokenCache};
use raito_domain::Result;
use tracing::debug;

use crate::auth::{CognitoIdentityProvider, HttpOrgLookup};

/// API authentication service for one principal
pub struct ApiAuthService<P = CognitoIdentityProvider, O = HttpOrgLookup>
where
    P: IdentityProvider + 'static,
    O: OrgLookup + 'static,
{
    cache: Arc<TokenCache<P, O>>,
    principal: String,
    secret: String,
}

impl<P, O> ApiAuthService<P, O>
where
    P: IdentityProvider + 'static,
    O: OrgLookup + 'static,
{
    /// Create a new API auth service
    ///
    /// # Arguments
    ///
    /// * `cache` - Token cache shared by every call of one client
    /// * `principal` - User to authenticate as
    /// * `secret` - Password of that user
    pub fn new(
        cache: Arc<TokenCache<P, O>>,
        principal: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self { cache, principal: principal.into(), secret: secret.into() }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn cache(&self) -> &Arc<TokenCache<P, O>> {
        &self.cache
    }
}

impl<P, O> fmt::Debug for ApiAuthService<P, O>
where
    P: IdentityProvider + 'static,
    O: OrgLookup + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiAuthService")
            .field("domain", &self.cache.domain())
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P, O> AccessTokenProvider for ApiAuthService<P, O>
where
    P: IdentityProvider + 'static,
    O: OrgLookup + 'static,
{
    async fn access_token(&self) -> Result<String> {
        debug!(principal = %self.principal, "Fetching access token");
        self.cache.get_token(&self.principal, &self.secret).await
    }
}
