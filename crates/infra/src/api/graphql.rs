//! GraphQL executor
//!
//! Posts `{operationName, query, variables}` to `<url>/query` through the
//! authenticating transport and unwraps the `data` object.

use raito_domain::constants::GRAPHQL_API_PATH;
use raito_domain::{RaitoError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::errors::map_status_error;
use super::transport::AuthenticatingTransport;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Deserialize)]
struct GraphqlErrorMessage {
    #[serde(default)]
    message: String,
}

/// Executes GraphQL operations against the Raito API
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    transport: AuthenticatingTransport,
    endpoint: String,
}

impl GraphqlClient {
    pub fn new(transport: AuthenticatingTransport, base_url: &str) -> Self {
        let separator = if base_url.ends_with('/') { "" } else { "/" };
        Self { transport, endpoint: format!("{base_url}{separator}{GRAPHQL_API_PATH}") }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one operation and return its `data` object
    ///
    /// # Errors
    /// - Any error from the transport (authentication, network)
    /// - `RaitoError::Auth` for a 401/403 answer
    /// - `RaitoError::Client` for other non-success statuses, a non-empty
    ///   `errors` array or a missing `data` object
    #[instrument(skip(self, query, variables))]
    pub async fn execute(&self, operation: &str, query: &str, variables: &Value) -> Result<Value> {
        let request = self
            .transport
            .request(Method::POST, &self.endpoint)
            .json(&GraphqlRequest { operation_name: operation, query, variables });

        let response = self.transport.send(request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RaitoError::transport(self.endpoint.clone(), e.to_string()))?;

        if !status.is_success() {
            return Err(map_status_error(status, &self.endpoint, &body));
        }

        let parsed: GraphqlResponse = serde_json::from_str(&body).map_err(|e| {
            RaitoError::Client(format!("failed to parse response of {operation}: {e}"))
        })?;

        if !parsed.errors.is_empty() {
            let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(RaitoError::Client(format!(
                "{operation} returned errors: {}",
                messages.join("; ")
            )));
        }

        debug!("GraphQL operation succeeded");
        parsed
            .data
            .ok_or_else(|| RaitoError::Client(format!("{operation} returned no data")))
    }

    /// Run one operation and return the top-level `field` of its data,
    /// `Value::Null` when the field is absent.
    ///
    /// # Errors
    /// Same as [`GraphqlClient::execute`].
    pub async fn execute_field(
        &self,
        operation: &str,
        query: &str,
        variables: &Value,
        field: &str,
    ) -> Result<Value> {
        let mut data = self.execute(operation, query, variables).await?;
        Ok(data.get_mut(field).map(Value::take).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use raito_core::AccessTokenProvider;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::HttpClient;

    struct MockAuthProvider;

    #[async_trait]
    impl AccessTokenProvider for MockAuthProvider {
        async fn access_token(&self) -> Result<String> {
            Ok("test-token".to_string())
        }
    }

    fn client_for(server: &MockServer) -> GraphqlClient {
        let transport =
            AuthenticatingTransport::new(HttpClient::new().unwrap(), Arc::new(MockAuthProvider), "acme");
        GraphqlClient::new(transport, &server.uri())
    }

    #[tokio::test]
    async fn posts_operation_and_returns_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Authorization", "token test-token"))
            .and(body_partial_json(json!({
                "operationName": "GetRole",
                "variables": { "id": "r1" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "role": { "__typename": "Role", "id": "r1" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let role = client
            .execute_field("GetRole", "query GetRole { role }", &json!({"id": "r1"}), "role")
            .await
            .unwrap();

        assert_eq!(role["id"], "r1");
    }

    #[tokio::test]
    async fn graphql_errors_become_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{ "message": "field a missing" }, { "message": "field b missing" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).execute("Broken", "query {}", &json!({})).await.unwrap_err();
        match err {
            RaitoError::Client(message) => {
                assert!(message.contains("field a missing; field b missing"));
            }
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_data_is_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server).execute("Empty", "query {}", &json!({})).await.unwrap_err();
        assert!(matches!(err, RaitoError::Client(_)));
    }

    #[tokio::test]
    async fn unauthorized_status_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let err = client_for(&server).execute("GetRole", "query {}", &json!({})).await.unwrap_err();
        assert!(matches!(err, RaitoError::Auth(_)));
    }

    #[test]
    fn endpoint_appends_query_path() {
        let transport =
            AuthenticatingTransport::new(HttpClient::new().unwrap(), Arc::new(MockAuthProvider), "acme");
        assert_eq!(
            GraphqlClient::new(transport.clone(), "https://api.raito.cloud").endpoint(),
            "https://api.raito.cloud/query"
        );
        assert_eq!(
            GraphqlClient::new(transport, "https://api.raito.cloud/").endpoint(),
            "https://api.raito.cloud/query"
        );
    }
}
