//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::fs;

use raito_domain::RaitoError;
use raito_infra::{config, RaitoClient};
use tempfile::TempDir;

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("raito.json");
    fs::write(
        &path,
        r#"{
            "domain": "acme",
            "user": "alice@acme.com",
            "secret": "s3cret",
            "url": "http://localhost:8080",
            "page_size": 50,
            "identity_provider": { "region": "us-east-1" }
        }"#,
    )
    .expect("Failed to write config file");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.domain, "acme");
    assert_eq!(config.page_size, 50);
    assert_eq!(config.base_url(), "http://localhost:8080/");
    assert_eq!(
        config.identity_provider.endpoint_url(),
        "https://cognito-idp.us-east-1.amazonaws.com/"
    );

    // A loaded config is enough to build a client
    let client = RaitoClient::new(&config).expect("Failed to build client");
    assert_eq!(client.graphql().endpoint(), "http://localhost:8080/query");
}

#[test]
fn test_load_config_from_toml_file_uses_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("raito.toml");
    fs::write(&path, "domain = \"acme\"\nuser = \"alice\"\nsecret = \"s3cret\"\n")
        .expect("Failed to write config file");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.user, "alice");
    assert_eq!(config.page_size, raito_domain::constants::DEFAULT_PAGE_SIZE);
}

#[test]
fn test_out_of_range_page_size_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("raito.toml");
    fs::write(&path, "domain = \"acme\"\nuser = \"alice\"\nsecret = \"s3cret\"\npage_size = 0\n")
        .expect("Failed to write config file");

    let result = config::load_from_file(Some(path));
    assert!(matches!(result, Err(RaitoError::Config(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let result = config::load_from_file(Some(dir.path().join("absent.json")));
    assert!(matches!(result, Err(RaitoError::Config(ref msg)) if msg.contains("not found")));
}
