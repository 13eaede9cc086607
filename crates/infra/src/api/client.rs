//! Raito Cloud client
//!
//! Wires the HTTP client, token cache, authenticating transport and GraphQL
//! executor together and hands out one call site per entity type. All call
//! sites of one client share the same token cache, so a single principal
//! authenticates once no matter how many operations run concurrently.

use std::sync::Arc;
use std::time::Duration;

use raito_core::{AccessTokenProvider, TokenCache};
use raito_domain::{ClientConfig, RaitoError, Result};
use tracing::{debug, instrument};

use super::auth::ApiAuthService;
use super::graphql::GraphqlClient;
use super::transport::AuthenticatingTransport;
use crate::auth::{CognitoIdentityProvider, HttpOrgLookup};
use crate::http::HttpClient;
use crate::services::{
    AccessProviderClient, DataObjectClient, DataSourceClient, GrantCategoryClient, GroupClient,
    IdentityStoreClient, RoleClient, UserClient,
};

/// Entry point to the Raito Cloud API
#[derive(Debug, Clone)]
pub struct RaitoClient {
    domain: String,
    page_size: usize,
    graphql: GraphqlClient,
}

impl RaitoClient {
    /// Create a client that authenticates with the credentials in `config`
    ///
    /// No network call happens here; the tenant lookup and the first token
    /// exchange run on the first API call.
    ///
    /// # Errors
    ///
    /// Returns `RaitoError::Config` if the configuration is incomplete or the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::builder().config(config.clone()).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> RaitoClientBuilder {
        RaitoClientBuilder::default()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Raw GraphQL access for operations without a typed call site
    pub fn graphql(&self) -> &GraphqlClient {
        &self.graphql
    }

    pub fn access_providers(&self) -> AccessProviderClient {
        AccessProviderClient::new(self.graphql.clone(), self.page_size)
    }

    pub fn data_objects(&self) -> DataObjectClient {
        DataObjectClient::new(self.graphql.clone(), self.page_size)
    }

    pub fn data_sources(&self) -> DataSourceClient {
        DataSourceClient::new(self.graphql.clone(), self.page_size)
    }

    pub fn grant_categories(&self) -> GrantCategoryClient {
        GrantCategoryClient::new(self.graphql.clone())
    }

    pub fn identity_stores(&self) -> IdentityStoreClient {
        IdentityStoreClient::new(self.graphql.clone(), self.page_size)
    }

    pub fn roles(&self) -> RoleClient {
        RoleClient::new(self.graphql.clone(), self.page_size)
    }

    pub fn groups(&self) -> GroupClient {
        GroupClient::new(self.graphql.clone(), self.page_size)
    }

    pub fn users(&self) -> UserClient {
        UserClient::new(self.graphql.clone())
    }
}

/// Builder for [`RaitoClient`]
#[derive(Default)]
pub struct RaitoClientBuilder {
    config: Option<ClientConfig>,
    token_provider: Option<Arc<dyn AccessTokenProvider>>,
}

impl RaitoClientBuilder {
    /// Set the client configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the built-in token cache by another token source
    #[must_use]
    pub fn token_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `RaitoError::Config` if no configuration was set, the
    /// configuration is invalid or the HTTP client cannot be built.
    #[instrument(skip(self))]
    pub fn build(self) -> Result<RaitoClient> {
        let config =
            self.config.ok_or_else(|| RaitoError::Config("client configuration not set".into()))?;
        config.validate()?;

        let http = HttpClient::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        let base_url = config.base_url();

        let token_provider = match self.token_provider {
            Some(provider) => provider,
            None => {
                let cache = TokenCache::new(
                    CognitoIdentityProvider::new(http.clone(), &config.identity_provider),
                    HttpOrgLookup::new(http.clone(), base_url.clone()),
                    config.domain.clone(),
                );
                let service: ApiAuthService =
                    ApiAuthService::new(Arc::new(cache), config.user.clone(), config.secret.clone());
                Arc::new(service)
            }
        };

        let transport = AuthenticatingTransport::new(http, token_provider, config.domain.clone());
        let graphql = GraphqlClient::new(transport, &base_url);

        debug!(domain = %config.domain, endpoint = %graphql.endpoint(), "Created Raito client");
        Ok(RaitoClient { domain: config.domain, page_size: config.page_size, graphql })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use raito_domain::constants::CLIENT_IDENTIFIER;
    use raito_domain::IdentityProviderConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct StaticToken;

    #[async_trait]
    impl AccessTokenProvider for StaticToken {
        async fn access_token(&self) -> Result<String> {
            Ok("static".to_string())
        }
    }

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig::new("acme", "alice@acme.com", "pw")
            .with_url(server.uri())
            .with_identity_provider(IdentityProviderConfig {
                endpoint: Some(format!("{}/idp", server.uri())),
                ..Default::default()
            })
    }

    #[test]
    fn builder_requires_config() {
        let err = RaitoClient::builder().build().unwrap_err();
        assert!(matches!(err, RaitoError::Config(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = RaitoClient::new(&ClientConfig::new("acme", "", "pw")).unwrap_err();
        assert!(matches!(err, RaitoError::Config(_)));
    }

    #[test]
    fn graphql_endpoint_follows_url() {
        let config = ClientConfig::new("acme", "alice", "pw").with_url("https://api.example.com");
        let client = RaitoClient::new(&config).unwrap();
        assert_eq!(client.graphql().endpoint(), "https://api.example.com/query");
        assert_eq!(client.domain(), "acme");
    }

    #[tokio::test]
    async fn custom_token_provider_skips_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Authorization", "token static"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "role": { "__typename": "Role", "id": "r1", "name": "Admin" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RaitoClient::builder()
            .config(config_for(&server))
            .token_provider(Arc::new(StaticToken))
            .build()
            .unwrap();

        let role = client.roles().get_role("r1").await.unwrap();
        assert_eq!(role.name, "Admin");
    }

    #[tokio::test]
    async fn authenticates_through_lookup_and_identity_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/org/acme"))
            .and(header("user-agent", CLIENT_IDENTIFIER))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ClientAppId": "app-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/idp"))
            .and(header("user-agent", CLIENT_IDENTIFIER))
            .and(body_partial_json(json!({ "ClientId": "app-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "IdToken": "id-1",
                    "RefreshToken": "refresh-1",
                    "ExpiresIn": 3600
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Authorization", "token id-1"))
            .and(header("Raito-Domain", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "user": { "__typename": "User", "id": "u1", "name": "Alice" } }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = RaitoClient::new(&config_for(&server)).unwrap();
        let users = client.users();

        assert_eq!(users.get_user("u1").await.unwrap().name, "Alice");
        assert_eq!(users.get_user("u1").await.unwrap().id, "u1");
    }
}
