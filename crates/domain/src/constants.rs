//! Client constants
//!
//! Centralized location for the fixed values shared by the engine and the
//! call sites.

// API endpoints
pub const DEFAULT_API_ENDPOINT: &str = "https://api.raito.cloud/";
pub const GRAPHQL_API_PATH: &str = "query";
pub const ORG_LOOKUP_PATH: &str = "admin/org/";

// Outbound headers
pub const CLIENT_IDENTIFIER: &str = "Raito SDK";
pub const DOMAIN_HEADER: &str = "Raito-Domain";
pub const AUTHORIZATION_SCHEME: &str = "token";

// Pagination
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 1000;

// Authentication
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 10;
pub const DEFAULT_IDP_REGION: &str = "eu-central-1";

// Transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
