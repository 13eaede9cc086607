//! Port interfaces for authentication collaborators
//!
//! These traits abstract the identity provider, the tenant lookup and the
//! token source so the cache and the transport can be tested with mocks.

use async_trait::async_trait;
use raito_domain::{AuthOutcome, Result};

/// Identity provider operations the token cache depends on
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Full password exchange for `username` against application `app_id`
    ///
    /// # Errors
    /// Returns `RaitoError::Auth` when the provider rejects the request and
    /// `RaitoError::Transport` when it cannot be reached.
    async fn initiate_password_auth(
        &self,
        app_id: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthOutcome>;

    /// Refresh exchange using a previously issued refresh token
    ///
    /// # Errors
    /// Same as [`IdentityProvider::initiate_password_auth`].
    async fn refresh_auth(&self, app_id: &str, refresh_token: &str) -> Result<AuthOutcome>;
}

/// Resolves a tenant domain to its client application identifier
#[async_trait]
pub trait OrgLookup: Send + Sync {
    /// # Errors
    /// Returns `RaitoError::Config` when the tenant cannot be resolved.
    async fn client_app_id(&self, domain: &str) -> Result<String>;
}

/// Source of bearer tokens for outbound API calls
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a token valid for at least the next few seconds
    ///
    /// # Errors
    /// Returns the configuration or authentication error that prevented
    /// obtaining a token.
    async fn access_token(&self) -> Result<String>;
}
