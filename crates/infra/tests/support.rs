//! Shared fixtures for client integration tests

#![allow(dead_code)]

use std::sync::Once;

use raito_domain::{ClientConfig, IdentityProviderConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOMAIN: &str = "acme";
pub const APP_ID: &str = "app-123";
pub const ID_TOKEN: &str = "id-token-1";

static TRACING: Once = Once::new();

/// Route client logs to the test harness output
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("raito_infra=debug,raito_core=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Client configuration pointing every endpoint at `server`
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(DOMAIN, "alice@acme.com", "s3cret")
        .with_url(server.uri())
        .with_page_size(2)
        .with_identity_provider(IdentityProviderConfig {
            endpoint: Some(format!("{}/idp", server.uri())),
            ..Default::default()
        })
}

/// Mount the tenant lookup and a password exchange, each expected `times`
pub async fn mount_authentication(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/admin/org/{DOMAIN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ClientAppId": APP_ID })))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/idp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": ID_TOKEN,
                "RefreshToken": "refresh-token-1",
                "ExpiresIn": 3600
            }
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// GraphQL envelope around one top-level field
pub fn data(field: &str, value: Value) -> Value {
    json!({ "data": { field: value } })
}

/// A `PagedResult` with the given edges
pub fn paged(edges: Value, has_next: bool, end_cursor: Option<&str>) -> Value {
    json!({
        "__typename": "PagedResult",
        "pageInfo": { "hasNextPage": has_next, "endCursor": end_cursor },
        "edges": edges
    })
}
