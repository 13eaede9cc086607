//! Client configuration structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_ENDPOINT, DEFAULT_IDP_REGION, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS,
    MAX_PAGE_SIZE,
};
use crate::errors::{RaitoError, Result};

/// Identity provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProviderConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Overrides the regional endpoint (used against local mocks)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self { region: default_region(), endpoint: None }
    }
}

impl IdentityProviderConfig {
    /// Endpoint that receives `InitiateAuth` calls
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

/// Configuration for one client instance
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tenant domain name
    pub domain: String,
    /// Principal used to authenticate
    pub user: String,
    pub secret: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub identity_provider: IdentityProviderConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but credentials
    pub fn new(
        domain: impl Into<String>,
        user: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            user: user.into(),
            secret: secret.into(),
            url: default_url(),
            page_size: default_page_size(),
            identity_provider: IdentityProviderConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the page size used by list operations
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the identity provider settings
    #[must_use]
    pub fn with_identity_provider(mut self, identity_provider: IdentityProviderConfig) -> Self {
        self.identity_provider = identity_provider;
        self
    }

    /// API base URL normalized to end with `/`
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.url.ends_with('/') {
            self.url.clone()
        } else {
            format!("{}/", self.url)
        }
    }

    /// Check the values that can be checked without network access.
    ///
    /// Domain shape is validated by the token cache before any lookup.
    ///
    /// # Errors
    /// Returns `RaitoError::Config` on a missing field or out-of-range page
    /// size.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(RaitoError::Config("no domain specified".into()));
        }
        if self.user.is_empty() {
            return Err(RaitoError::Config("no user specified".into()));
        }
        if self.url.is_empty() {
            return Err(RaitoError::Config("no API URL specified".into()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(RaitoError::Config(format!(
                "page size {} outside of 1..={MAX_PAGE_SIZE}",
                self.page_size
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("domain", &self.domain)
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .field("url", &self.url)
            .field("page_size", &self.page_size)
            .field("identity_provider", &self.identity_provider)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_region() -> String {
    DEFAULT_IDP_REGION.to_string()
}

fn default_url() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
