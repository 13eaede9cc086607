//! Token cache with lazy acquisition and transparent refresh
//!
//! Owns one credential record per principal and decides, on every call,
//! whether the cached ID token can be reused, must be refreshed, or requires
//! a full password exchange:
//! - Valid record (ID token, refresh token, expiry beyond the safety margin):
//!   reuse, no network call
//! - Invalid record with a refresh token: refresh exchange, falling back to
//!   one password exchange if the refresh is rejected
//! - Invalid record without a refresh token: password exchange
//!
//! The whole check-then-exchange sequence runs under a per-principal async
//! lock, so concurrent callers that observe an expired token share a single
//! exchange instead of racing to overwrite the record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::Mutex;
use raito_domain::constants::TOKEN_EXPIRY_MARGIN_SECS;
use raito_domain::{AuthOutcome, AuthenticationResult, CredentialRecord, RaitoError, Result};
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tracing::{debug, info, instrument, warn};

use super::ports::{IdentityProvider, OrgLookup};
use crate::utils::validate_domain;

type RecordSlot = Arc<AsyncMutex<CredentialRecord>>;

/// Credential cache shared by every call made through one client instance
pub struct TokenCache<P: IdentityProvider + 'static, O: OrgLookup + 'static> {
    identity_provider: Arc<P>,
    org_lookup: Arc<O>,
    domain: String,
    client_app_id: OnceCell<String>,
    records: Mutex<HashMap<String, RecordSlot>>,
    expiry_margin: Duration,
}

impl<P: IdentityProvider + 'static, O: OrgLookup + 'static> TokenCache<P, O> {
    /// Create a cache for the tenant `domain`
    ///
    /// Nothing is validated or fetched until the first
    /// [`TokenCache::get_token`] call.
    #[must_use]
    pub fn new(identity_provider: P, org_lookup: O, domain: impl Into<String>) -> Self {
        Self {
            identity_provider: Arc::new(identity_provider),
            org_lookup: Arc::new(org_lookup),
            domain: domain.into(),
            client_app_id: OnceCell::new(),
            records: Mutex::new(HashMap::new()),
            expiry_margin: Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS),
        }
    }

    /// Override the safety margin subtracted from the token expiry
    #[must_use]
    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Get a bearer token for `principal`, authenticating with `secret` when
    /// no reusable or refreshable credentials are cached.
    ///
    /// # Errors
    /// - `RaitoError::Config` if the domain is malformed or cannot be resolved
    /// - `RaitoError::Auth` if the identity provider fails; the cached record
    ///   is left untouched so a later call can retry cleanly
    #[instrument(skip(self, secret), fields(domain = %self.domain))]
    pub async fn get_token(&self, principal: &str, secret: &str) -> Result<String> {
        let slot = self.record_slot(principal);
        let mut record = slot.lock().await;

        let app_id = self.client_app_id().await?;

        if record.is_valid_at(Utc::now(), self.expiry_margin) {
            if let Some(token) = record.id_token() {
                debug!("Reusing cached ID token");
                return Ok(token.to_string());
            }
        }

        let (id_token, result) = match record.refresh_token().map(str::to_string) {
            Some(refresh_token) => match self.refresh(app_id, principal, &refresh_token).await {
                Ok(issued) => issued,
                Err(err) => {
                    warn!(error = %err, "Token refresh failed, falling back to password authentication");
                    self.authenticate(app_id, principal, secret).await?
                }
            },
            None => self.authenticate(app_id, principal, secret).await?,
        };

        record.apply(id_token.clone(), &result, Utc::now());
        Ok(id_token)
    }

    /// Copy of the cached record for `principal`, if one was created
    pub async fn snapshot(&self, principal: &str) -> Option<CredentialRecord> {
        let slot = self.records.lock().get(principal).cloned()?;
        let record = slot.lock().await;
        Some(record.clone())
    }

    fn record_slot(&self, principal: &str) -> RecordSlot {
        self.records
            .lock()
            .entry(principal.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(CredentialRecord::empty(principal))))
            .clone()
    }

    async fn client_app_id(&self) -> Result<&str> {
        let app_id = self
            .client_app_id
            .get_or_try_init(|| async {
                validate_domain(&self.domain)?;

                let app_id = self.org_lookup.client_app_id(&self.domain).await?;
                if app_id.is_empty() {
                    return Err(RaitoError::Config(format!(
                        "no client application id found for domain {:?}",
                        self.domain
                    )));
                }

                info!(domain = %self.domain, "Resolved client application id");
                Ok(app_id)
            })
            .await?;

        Ok(app_id.as_str())
    }

    async fn authenticate(
        &self,
        app_id: &str,
        principal: &str,
        secret: &str,
    ) -> Result<(String, AuthenticationResult)> {
        debug!("Starting password authentication");

        let outcome = self
            .identity_provider
            .initiate_password_auth(app_id, principal, secret)
            .await
            .map_err(|e| auth_failure(principal, &e))?;

        let issued = accept_outcome(outcome).map_err(|e| auth_failure(principal, &e))?;
        info!("Password authentication succeeded");
        Ok(issued)
    }

    async fn refresh(
        &self,
        app_id: &str,
        principal: &str,
        refresh_token: &str,
    ) -> Result<(String, AuthenticationResult)> {
        debug!("Refreshing ID token");

        let outcome = self
            .identity_provider
            .refresh_auth(app_id, refresh_token)
            .await
            .map_err(|e| auth_failure(principal, &e))?;

        let issued = accept_outcome(outcome).map_err(|e| auth_failure(principal, &e))?;
        info!("Token refresh succeeded");
        Ok(issued)
    }
}

fn accept_outcome(outcome: AuthOutcome) -> Result<(String, AuthenticationResult)> {
    match outcome {
        AuthOutcome::Authenticated(result) => match result.id_token.clone() {
            Some(id_token) => Ok((id_token, result)),
            None => Err(RaitoError::Auth("no id token found in authentication result".into())),
        },
        AuthOutcome::Challenge { name } => Err(RaitoError::Auth(format!(
            "invalid authentication result received (challenge {name:?})"
        ))),
    }
}

fn auth_failure(principal: &str, err: &RaitoError) -> RaitoError {
    let message = match err {
        RaitoError::Auth(message) => message.clone(),
        other => other.to_string(),
    };
    RaitoError::Auth(format!("authentication flow for user {principal:?} failed: {message}"))
}
