//! Authentication: collaborator ports and the bearer-token cache

pub mod ports;
pub mod token_cache;

pub use ports::{AccessTokenProvider, IdentityProvider, OrgLookup};
pub use token_cache::TokenCache;
