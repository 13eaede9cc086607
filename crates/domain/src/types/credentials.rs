//! Credential record and identity-provider exchange results

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Tokens returned by a successful identity-provider exchange
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// ID token used as bearer credential; providers may omit it on a
    /// nominally successful response, which the cache treats as a failure
    pub id_token: Option<String>,
    /// New refresh token, absent when the provider keeps the previous one
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, counted from receipt
    pub expires_in: i64,
}

impl fmt::Debug for AuthenticationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationResult")
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Outcome of a password or refresh exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The provider issued tokens
    Authenticated(AuthenticationResult),
    /// The provider demands an additional step the client cannot perform
    Challenge { name: String },
}

/// Cached credential set for one principal
///
/// Created empty on first use and mutated in place by every successful
/// exchange. A failed exchange never touches it.
#[derive(Clone, Default)]
pub struct CredentialRecord {
    principal: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expiration: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// Create an empty record for `principal`
    #[must_use]
    pub fn empty(principal: impl Into<String>) -> Self {
        Self { principal: principal.into(), ..Self::default() }
    }

    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    #[must_use]
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// A record is valid only when ID token, refresh token and expiration are
    /// all present and `now + margin` is still before the expiration.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match (&self.id_token, &self.refresh_token, self.expiration) {
            (Some(_), Some(_), Some(expiration)) => now + margin < expiration,
            _ => false,
        }
    }

    /// Overwrite the record with the tokens of a successful exchange.
    ///
    /// The refresh token is only replaced when the provider returned one.
    pub fn apply(&mut self, id_token: String, result: &AuthenticationResult, now: DateTime<Utc>) {
        if let Some(refresh_token) = &result.refresh_token {
            self.refresh_token = Some(refresh_token.clone());
        }
        self.id_token = Some(id_token);
        self.expiration = Some(now + Duration::seconds(result.expires_in));
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("principal", &self.principal)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expiration", &self.expiration)
            .finish()
    }
}
