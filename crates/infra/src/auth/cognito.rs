//! Cognito `InitiateAuth` identity provider
//!
//! Talks the AWS JSON 1.1 protocol directly: one POST per exchange with the
//! operation named in the `X-Amz-Target` header.

use std::collections::HashMap;

use async_trait::async_trait;
use raito_core::IdentityProvider;
use raito_domain::{AuthOutcome, AuthenticationResult, IdentityProviderConfig, RaitoError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::HttpClient;

const AMZ_TARGET_HEADER: &str = "X-Amz-Target";
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";
const REFRESH_TOKEN_AUTH: &str = "REFRESH_TOKEN_AUTH";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<CognitoTokens>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CognitoTokens {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(rename = "__type", default)]
    error_type: String,
    #[serde(alias = "Message", default)]
    message: String,
}

/// Identity provider backed by an Amazon Cognito user pool
#[derive(Debug, Clone)]
pub struct CognitoIdentityProvider {
    http: HttpClient,
    endpoint: String,
}

impl CognitoIdentityProvider {
    pub fn new(http: HttpClient, config: &IdentityProviderConfig) -> Self {
        Self { http, endpoint: config.endpoint_url() }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        app_id: &str,
        parameters: HashMap<&str, &str>,
    ) -> Result<AuthOutcome> {
        let body = serde_json::to_vec(&InitiateAuthRequest {
            auth_flow: flow,
            client_id: app_id,
            auth_parameters: parameters,
        })
        .map_err(|e| RaitoError::Client(format!("failed to encode InitiateAuth request: {e}")))?;

        let request = self
            .http
            .request(Method::POST, &self.endpoint)
            .header(AMZ_TARGET_HEADER, INITIATE_AUTH_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .body(body);

        let response = self.http.send(request).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RaitoError::transport(self.endpoint.clone(), e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ServiceError>(&text) {
                Ok(err) if !err.error_type.is_empty() => format!("{}: {}", err.error_type, err.message),
                Ok(err) if !err.message.is_empty() => err.message,
                _ => format!("identity provider returned status {status}"),
            };
            return Err(RaitoError::Auth(message));
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&text)
            .map_err(|e| RaitoError::Auth(format!("invalid InitiateAuth response: {e}")))?;

        match (parsed.authentication_result, parsed.challenge_name) {
            (Some(tokens), _) => {
                debug!(flow, expires_in = tokens.expires_in, "Identity provider issued tokens");
                Ok(AuthOutcome::Authenticated(AuthenticationResult {
                    id_token: tokens.id_token,
                    refresh_token: tokens.refresh_token,
                    expires_in: tokens.expires_in,
                }))
            }
            (None, Some(name)) => Ok(AuthOutcome::Challenge { name }),
            (None, None) => Err(RaitoError::Auth(
                "InitiateAuth response carried neither tokens nor a challenge".into(),
            )),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    #[instrument(skip(self, password), fields(endpoint = %self.endpoint))]
    async fn initiate_password_auth(
        &self,
        app_id: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthOutcome> {
        let parameters = HashMap::from([("USERNAME", username), ("PASSWORD", password)]);
        self.initiate_auth(USER_PASSWORD_AUTH, app_id, parameters).await
    }

    #[instrument(skip(self, refresh_token), fields(endpoint = %self.endpoint))]
    async fn refresh_auth(&self, app_id: &str, refresh_token: &str) -> Result<AuthOutcome> {
        let parameters = HashMap::from([("REFRESH_TOKEN", refresh_token)]);
        self.initiate_auth(REFRESH_TOKEN_AUTH, app_id, parameters).await
    }
}
