//! Raito Cloud API access
//!
//! Layering, from the wire up:
//!
//! - [`AuthenticatingTransport`] attaches identification and a fresh token
//! - [`GraphqlClient`] posts operations and unwraps `data`
//! - [`RaitoClient`] wires everything and hands out per-entity call sites

pub mod auth;
pub mod client;
pub mod errors;
pub mod graphql;
pub mod transport;

pub use auth::ApiAuthService;
pub use client::{RaitoClient, RaitoClientBuilder};
pub use errors::map_status_error;
pub use graphql::GraphqlClient;
pub use transport::AuthenticatingTransport;
