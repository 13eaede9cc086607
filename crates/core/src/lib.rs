//! # Raito Core
//!
//! Engine logic of the client library - no HTTP or file I/O.
//!
//! This crate contains:
//! - The PageStream engine turning cursor pagination into item streams
//! - The TokenCache managing bearer-token acquisition and refresh
//! - Port interfaces (traits) for the identity provider, tenant lookup and
//!   token source
//!
//! ## Architecture Principles
//! - Only depends on `raito-domain`
//! - All external collaborators via traits
//! - Pure, testable logic driven by injected closures and mocks

pub mod auth;
pub mod pagination;
pub mod utils;

pub use auth::{AccessTokenProvider, IdentityProvider, OrgLookup, TokenCache};
pub use pagination::{paginate, ListStream};
pub use utils::validate_domain;
