//! # Raito Infrastructure
//!
//! Infrastructure implementations of core ports and the public client.
//!
//! This crate contains:
//! - HTTP client and error conversions
//! - Identity provider and tenant lookup adapters
//! - Authenticating transport and GraphQL executor
//! - Per-entity call sites and the [`RaitoClient`] entry point
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `raito-core`
//! - Depends on `raito-domain` and `raito-core`
//! - Contains all "impure" code (network and file I/O)

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod services;

// Re-export commonly used items
pub use api::{GraphqlClient, RaitoClient, RaitoClientBuilder};
pub use auth::{CognitoIdentityProvider, HttpOrgLookup};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use services::{
    AccessProviderClient, DataObjectClient, DataSourceClient, GrantCategoryClient, GroupClient,
    IdentityStoreClient, ListOptions, RoleAssignmentScope, RoleClient, RoleTarget, UserClient,
};
