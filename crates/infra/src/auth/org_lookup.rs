//! Tenant resolution over the public admin endpoint

use async_trait::async_trait;
use raito_core::OrgLookup;
use raito_domain::constants::ORG_LOOKUP_PATH;
use raito_domain::{RaitoError, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::HttpClient;

#[derive(Deserialize)]
struct OrgInfo {
    #[serde(rename = "ClientAppId", alias = "clientAppId", default)]
    client_app_id: String,
}

/// Resolves `<base>/admin/org/<domain>` to the client application id
#[derive(Debug, Clone)]
pub struct HttpOrgLookup {
    http: HttpClient,
    base_url: String,
}

impl HttpOrgLookup {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { http, base_url }
    }

    fn lookup_url(&self, domain: &str) -> String {
        format!("{}{}{}", self.base_url, ORG_LOOKUP_PATH, domain.to_lowercase())
    }
}

#[async_trait]
impl OrgLookup for HttpOrgLookup {
    #[instrument(skip(self))]
    async fn client_app_id(&self, domain: &str) -> Result<String> {
        let url = self.lookup_url(domain);
        let response = self.http.send(self.http.request(Method::GET, &url)).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RaitoError::Config(format!(
                "unexpected status code {} when fetching organization information for domain \
                 {domain:?}",
                status.as_u16()
            )));
        }

        let info: OrgInfo = response.json().await.map_err(|e| {
            RaitoError::Config(format!("invalid organization information for domain {domain:?}: {e}"))
        })?;

        if info.client_app_id.is_empty() {
            return Err(RaitoError::Config(format!(
                "no client application id in organization information for domain {domain:?}"
            )));
        }

        debug!("Fetched organization information");
        Ok(info.client_app_id)
    }
}
