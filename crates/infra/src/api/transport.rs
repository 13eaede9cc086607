//! Authenticating transport
//!
//! Decorates every outbound API request with the client identifier, the
//! tenant domain and a fresh bearer token before handing it to the HTTP
//! client. No token is held here: every call asks the token provider, which
//! owns all caching.

use std::sync::Arc;

use raito_core::AccessTokenProvider;
use raito_domain::constants::{AUTHORIZATION_SCHEME, CLIENT_IDENTIFIER, DOMAIN_HEADER};
use raito_domain::Result;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response};
use tracing::instrument;

use crate::http::HttpClient;

/// HTTP transport that authenticates every request
#[derive(Clone)]
pub struct AuthenticatingTransport {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    domain: String,
}

impl AuthenticatingTransport {
    pub fn new(http: HttpClient, auth: Arc<dyn AccessTokenProvider>, domain: impl Into<String>) -> Self {
        Self { http, auth, domain: domain.into() }
    }

    /// Create a request builder for `url`
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Attach headers and a token, then send
    ///
    /// # Errors
    /// Fails without sending anything when no token can be obtained;
    /// otherwise returns the transport error of the HTTP client.
    #[instrument(skip(self, builder), fields(domain = %self.domain))]
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let token = self.auth.access_token().await?;

        let builder = builder
            .header(USER_AGENT, CLIENT_IDENTIFIER)
            .header(DOMAIN_HEADER, &self.domain)
            .header(AUTHORIZATION, format!("{AUTHORIZATION_SCHEME} {token}"));

        self.http.send(builder).await
    }
}

impl std::fmt::Debug for AuthenticatingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatingTransport").field("domain", &self.domain).finish_non_exhaustive()
    }
}
